//! Plate-local cells and their crust content.

use crate::rock_column::RockColumn;

/// Plate identifier.
pub type PlateId = u16;

/// Plain `(plate, local cell)` address; never an ownership edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellRef {
    /// Owning plate.
    pub plate: PlateId,
    /// Local cell id within that plate.
    pub cell: u32,
}

impl CellRef {
    /// Address of `cell` on `plate`.
    pub fn new(plate: PlateId, cell: u32) -> Self {
        Self { plate, cell }
    }
}

/// What a cell holds.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum CellContent {
    /// No crust.
    #[default]
    Empty,
    /// A crust column.
    Occupied(RockColumn),
}

impl CellContent {
    /// The column, if any.
    pub fn column(&self) -> Option<&RockColumn> {
        match self {
            CellContent::Empty => None,
            CellContent::Occupied(c) => Some(c),
        }
    }

    /// Mutable column, if any.
    pub fn column_mut(&mut self) -> Option<&mut RockColumn> {
        match self {
            CellContent::Empty => None,
            CellContent::Occupied(c) => Some(c),
        }
    }

    /// True when a column is present.
    pub fn is_occupied(&self) -> bool {
        matches!(self, CellContent::Occupied(_))
    }
}

/// One local cell of a plate.
#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    plate: PlateId,
    id: u32,
    content: CellContent,
    subducted_by: Option<CellRef>,
}

impl Cell {
    /// An empty cell.
    pub fn new(plate: PlateId, id: u32) -> Self {
        Self { plate, id, content: CellContent::Empty, subducted_by: None }
    }

    /// Owning plate id.
    pub fn plate(&self) -> PlateId {
        self.plate
    }

    /// Local id.
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Address of this cell.
    pub fn cell_ref(&self) -> CellRef {
        CellRef::new(self.plate, self.id)
    }

    /// Current content.
    pub fn content(&self) -> &CellContent {
        &self.content
    }

    /// The column, if occupied.
    pub fn column(&self) -> Option<&RockColumn> {
        self.content.column()
    }

    /// Mutable column, if occupied.
    pub fn column_mut(&mut self) -> Option<&mut RockColumn> {
        self.content.column_mut()
    }

    /// True when the cell holds crust.
    pub fn is_occupied(&self) -> bool {
        self.content.is_occupied()
    }

    /// Occupied with continental crust.
    pub fn is_continental(&self) -> bool {
        self.column().is_some_and(RockColumn::is_continental)
    }

    /// Put `column` in this cell, replacing whatever was there.
    pub fn fill(&mut self, column: RockColumn) {
        self.content = CellContent::Occupied(column);
        self.subducted_by = None;
    }

    /// Empty the cell and return its former column.
    pub fn destroy(&mut self) -> Option<RockColumn> {
        self.subducted_by = None;
        match std::mem::take(&mut self.content) {
            CellContent::Empty => None,
            CellContent::Occupied(c) => Some(c),
        }
    }

    /// The cell riding over this one, if any.
    pub fn subducted_by(&self) -> Option<CellRef> {
        self.subducted_by
    }

    /// Record the overriding cell. Empty cells are never marked; returns false then.
    pub fn mark_subducted_by(&mut self, top: CellRef) -> bool {
        if !self.is_occupied() {
            return false;
        }
        self.subducted_by = Some(top);
        true
    }

    /// Drop the subduction mark.
    pub fn clear_subducted_by(&mut self) {
        self.subducted_by = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_cells_never_carry_marks() {
        let mut c = Cell::new(3, 7);
        assert!(!c.mark_subducted_by(CellRef::new(1, 1)));
        assert_eq!(c.subducted_by(), None);

        c.fill(RockColumn::with_isostasy(7000.0, 2890.0, 3300.0));
        assert!(c.mark_subducted_by(CellRef::new(1, 1)));
        let col = c.destroy();
        assert!(col.is_some());
        assert_eq!(c.subducted_by(), None);
        assert!(!c.is_occupied());
        assert_eq!(c.cell_ref(), CellRef::new(3, 7));
    }
}

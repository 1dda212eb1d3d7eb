pub mod d3;
pub mod terminal;
pub mod text;

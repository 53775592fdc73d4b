mod proximity;
pub use proximity::*;

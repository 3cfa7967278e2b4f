pub mod matching;
pub mod numeric;

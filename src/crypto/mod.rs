pub mod casig;
pub mod dleq;
pub mod group;
pub mod hash;
pub mod schnorr;

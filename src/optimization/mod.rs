pub mod simplifier;

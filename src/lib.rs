pub mod alignment;
pub mod bam;
pub mod error;
pub mod pileup;
pub mod pipeline;
pub mod position;
pub mod reference;
pub mod window;

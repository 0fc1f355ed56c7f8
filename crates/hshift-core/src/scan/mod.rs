pub mod pattern;
pub mod sampler;
mod scanner;
mod verifier;

pub use pattern::{
    FieldSignature, ProbeWindow, SignatureSet, find_all, format_pattern, load_signatures,
    parse_pattern, save_signatures,
};
pub use scanner::{ScanConfig, ScanState, Scanner};
pub use verifier::{GameWindow, Verifier};

pub mod stage0_transcribe;
pub mod stage1_prd;
pub mod stage2_extract;
pub mod stage3_select;
pub mod stage4_compose;
pub mod stage5_file;

pub use stage0_transcribe::*;
pub use stage1_prd::*;
pub use stage2_extract::*;
pub use stage3_select::*;
pub use stage4_compose::*;
pub use stage5_file::*;

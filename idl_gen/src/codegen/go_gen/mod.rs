pub mod decls;
pub mod helpers;
pub mod imports;
pub mod interface;
pub mod layout;
pub mod params;
pub mod syscall;
pub mod types;

/* Re-export main public items */
pub use decls::{EnumGap, emit_constdef, emit_enum, emit_struct, emit_typedef};
pub use helpers::Declaration;
pub use imports::{GoImport, Imports};
pub use interface::{MethodStub, emit_interface, plan_methods};
pub use layout::{LayoutRegistry, VtableLayout, VtableSlot};
pub use params::Marshaling;
pub use syscall::{CallPlan, SyscallTier, select_tier};
pub use types::{MappedType, TypeMapper};

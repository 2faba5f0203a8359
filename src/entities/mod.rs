//! Entity type definitions

pub mod module;
pub mod product;
pub mod run;
pub mod suite;
pub mod test_case;
pub mod version;

pub use module::{AttributeType, ModuleAttribute, ModulePatch, NewAttribute, ProductModule};
pub use product::Product;
pub use run::{OverlayEntry, RunPatch, RunStatus, TestRun, TestSuiteRef};
pub use suite::{SuitePatch, TestCaseRef, TestSuite};
pub use test_case::{ManualTestCaseStep, NewTestCase, TestCase, TestCaseAttribute, TestType};
pub use version::ProductVersion;

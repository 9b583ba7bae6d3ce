//! 戰棋核心：棋盤、單位、移動範圍、戰鬥判定與 buff
//!
//! 不含任何引擎綁定（渲染、UI、關卡編輯器），
//! 這些外部協作者只透過 [`presenter::Presenter`] 接收通知。

pub mod alias;
pub mod battlefield;
pub mod buff;
pub mod constants;
pub mod core_types;
pub mod error;
pub mod loader;
pub mod loader_schema;
pub mod logic;
pub mod presenter;
pub mod terrain;
pub mod unit;

#[cfg(feature = "test-helpers")]
pub mod test_helpers;

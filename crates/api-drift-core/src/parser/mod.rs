//! Python 解析器模块
//!
//! 提供 Tree-sitter Python 解析器、语句分类以及表达式文本规范化

pub mod common;
pub mod python;

// 重新导出核心类型
pub use common::{expression_text, node_text, render_expression};
pub use python::{FunctionNode, PythonParser, Statement, strip_byte_order_mark};

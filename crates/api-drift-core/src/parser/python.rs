//! Python 语言解析器实现
//!
//! 基于 Tree-sitter 的 Python 源码解析器，以及语法树语句的分类

use super::common::{find_child_by_kind, named_children};
use crate::error::{ApiDriftError, Result};
use tree_sitter::{Node, Parser, Tree};

/// UTF-8 字节序标记
const BYTE_ORDER_MARK: char = '\u{feff}';

/// Python 语言解析器
pub struct PythonParser {
    parser: Parser,
}

impl PythonParser {
    /// 创建新的 Python 解析器
    pub fn new() -> Result<Self> {
        let language = tree_sitter_python::LANGUAGE.into();
        let mut parser = Parser::new();

        parser.set_language(&language).map_err(|e| {
            ApiDriftError::TreeSitterError(format!("Failed to set Python language: {e}"))
        })?;

        Ok(Self { parser })
    }

    /// 解析源码为语法树
    ///
    /// 语法树中出现 `ERROR` 或 `MISSING` 节点时视为语法错误。
    /// 返回的语法树对应去掉字节序标记后的文本，见 [`strip_byte_order_mark`]。
    pub fn parse_source(&mut self, source: &str) -> Result<Tree> {
        let source = strip_byte_order_mark(source);
        let tree = self.parser.parse(source, None).ok_or_else(|| {
            ApiDriftError::ParseError("Failed to parse Python source code".to_string())
        })?;

        let root = tree.root_node();
        if root.has_error() {
            let position = first_error_position(root)
                .map(|(row, column)| format!(" at line {}, column {}", row + 1, column + 1))
                .unwrap_or_default();
            return Err(ApiDriftError::ParseError(format!(
                "Python source contains syntax errors{position}"
            )));
        }

        Ok(tree)
    }
}

/// 去掉文件开头的字节序标记
pub fn strip_byte_order_mark(source: &str) -> &str {
    source.strip_prefix(BYTE_ORDER_MARK).unwrap_or(source)
}

/// 查找第一个错误节点的位置（行、列，均从 0 开始）
fn first_error_position(node: Node) -> Option<(usize, usize)> {
    if node.is_error() || node.is_missing() {
        let point = node.start_position();
        return Some((point.row, point.column));
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.has_error() {
            if let Some(found) = first_error_position(child) {
                return Some(found);
            }
        }
    }

    None
}

/// 函数定义节点及其装饰器
#[derive(Debug, Clone)]
pub struct FunctionNode<'tree> {
    pub definition: Node<'tree>,
    pub decorators: Vec<Node<'tree>>,
}

impl FunctionNode<'_> {
    /// 是否为 `async def`
    pub fn is_async(&self) -> bool {
        find_child_by_kind(self.definition, "async").is_some()
    }
}

/// 模块级或类体中的语句分类
#[derive(Debug, Clone)]
pub enum Statement<'tree> {
    /// `def` / `async def`，可能带装饰器
    Function(FunctionNode<'tree>),
    /// `class`，装饰器不参与 API 快照
    Class(Node<'tree>),
    /// `expression_statement` 中的赋值或带注解的声明
    Assignment(Node<'tree>),
    /// `from X import ...`，包括 `from __future__ import ...`
    ImportFrom(Node<'tree>),
    /// 仍处于模块级作用域的复合语句：`if`、`try`、`with` 及其子句
    Compound(Node<'tree>),
    Other,
}

impl<'tree> Statement<'tree> {
    /// 根据节点类型对语句分类
    pub fn classify(node: Node<'tree>) -> Self {
        match node.kind() {
            "function_definition" => Statement::Function(FunctionNode {
                definition: node,
                decorators: Vec::new(),
            }),
            "class_definition" => Statement::Class(node),
            "decorated_definition" => Self::classify_decorated(node),
            "expression_statement" => match named_children(node).first() {
                Some(child) if child.kind() == "assignment" => Statement::Assignment(*child),
                _ => Statement::Other,
            },
            "import_from_statement" | "future_import_statement" => Statement::ImportFrom(node),
            "if_statement" | "elif_clause" | "else_clause" | "try_statement" | "except_clause"
            | "except_group_clause" | "finally_clause" | "with_statement" | "block" => {
                Statement::Compound(node)
            }
            _ => Statement::Other,
        }
    }

    fn classify_decorated(node: Node<'tree>) -> Self {
        let Some(definition) = node.child_by_field_name("definition") else {
            return Statement::Other;
        };

        match definition.kind() {
            "function_definition" => {
                let decorators = named_children(node)
                    .into_iter()
                    .filter(|child| child.kind() == "decorator")
                    .collect();
                Statement::Function(FunctionNode {
                    definition,
                    decorators,
                })
            }
            "class_definition" => Statement::Class(definition),
            _ => Statement::Other,
        }
    }
}

//! 公共 API 签名提取模块
//!
//! 遍历单个 Python 模块的语法树，提取公共函数、类、`__all__` 导出与重新导出的名称。
//! 只遍历模块级语句（包括模块级的 `if`/`try`/`with` 块）以及类体的第一层，函数体不会被遍历。

use crate::error::Result;
use crate::model::{
    ClassInfo, FunctionSignature, KEYWORD_ONLY_MARKER, ModuleInfo, POSITIONAL_ONLY_MARKER,
    is_public_class_name, is_public_function_name,
};
use crate::parser::common::{find_child_by_kind, named_children};
use crate::parser::{
    FunctionNode, PythonParser, Statement, expression_text, node_text, strip_byte_order_mark,
};
use tracing::debug;
use tree_sitter::Node;

/// 显式导出列表的变量名
const EXPORTS_VARIABLE: &str = "__all__";

/// 公共 API 签名提取器
pub struct SignatureExtractor {
    parser: PythonParser,
}

impl SignatureExtractor {
    /// 创建新的签名提取器
    pub fn new() -> Result<Self> {
        Ok(Self {
            parser: PythonParser::new()?,
        })
    }

    /// 提取模块的公共 API
    ///
    /// 源码存在语法错误时返回 `None`，调用方将其视为模块不存在。
    /// 返回的快照 `name` 为空，由快照构建器填写。
    pub fn extract(&mut self, source: &str) -> Option<ModuleInfo> {
        let tree = match self.parser.parse_source(source) {
            Ok(tree) => tree,
            Err(e) => {
                debug!("Skipping module that failed to parse: {}", e);
                return None;
            }
        };

        let mut collector = ModuleCollector {
            source: strip_byte_order_mark(source),
            module: ModuleInfo::default(),
        };
        collector.visit_block(tree.root_node());

        Some(collector.module)
    }
}

/// 模块级语句收集器
struct ModuleCollector<'s> {
    source: &'s str,
    module: ModuleInfo,
}

impl ModuleCollector<'_> {
    fn visit_block(&mut self, node: Node) {
        for child in named_children(node) {
            match Statement::classify(child) {
                Statement::Function(function) => {
                    if let Some(signature) = extract_function(&function, self.source) {
                        self.module
                            .functions
                            .insert(signature.name.clone(), signature);
                    }
                }
                Statement::Class(class_node) => {
                    if let Some(class) = extract_class(class_node, self.source) {
                        self.module.classes.insert(class.name.clone(), class);
                    }
                }
                Statement::Assignment(assignment) => self.collect_exports(assignment),
                Statement::ImportFrom(import) => self.collect_re_exports(import),
                Statement::Compound(compound) => self.visit_block(compound),
                Statement::Other => {}
            }
        }
    }

    /// 收集 `__all__ = [...]` 中的字符串字面量
    fn collect_exports(&mut self, assignment: Node) {
        let Some(left) = assignment.child_by_field_name("left") else {
            return;
        };
        if left.kind() != "identifier" || node_text(left, self.source) != EXPORTS_VARIABLE {
            return;
        }

        let Some(right) = assignment.child_by_field_name("right") else {
            return;
        };
        if right.kind() != "list" {
            return;
        }

        let names = named_children(right)
            .into_iter()
            .filter_map(|element| string_literal_value(element, self.source));
        self.module.exports.extend(names);
    }

    /// 收集 `from X import a as b` 引入的公共名称
    fn collect_re_exports(&mut self, import: Node) {
        if find_child_by_kind(import, "wildcard_import").is_some() {
            self.module.re_exports.push("*".to_string());
            return;
        }

        let mut cursor = import.walk();
        for name_node in import.children_by_field_name("name", &mut cursor) {
            let name = match name_node.kind() {
                "aliased_import" => name_node
                    .child_by_field_name("alias")
                    .or_else(|| name_node.child_by_field_name("name")),
                _ => Some(name_node),
            };

            if let Some(name) = name.map(|node| node_text(node, self.source)) {
                if !name.starts_with('_') {
                    self.module.re_exports.push(name.to_string());
                }
            }
        }
    }
}

/// 提取函数签名，私有函数返回 `None`
fn extract_function(function: &FunctionNode, source: &str) -> Option<FunctionSignature> {
    let definition = function.definition;
    let name = node_text(definition.child_by_field_name("name")?, source);
    if !is_public_function_name(name) {
        return None;
    }

    let parameters = definition
        .child_by_field_name("parameters")
        .map(|node| ParameterList::collect(node, source))
        .unwrap_or_default();

    let return_annotation = definition
        .child_by_field_name("return_type")
        .map(|node| expression_text(node, source));

    let decorators = function
        .decorators
        .iter()
        .filter_map(|decorator| named_children(*decorator).into_iter().next())
        .map(|expression| expression_text(expression, source))
        .collect();

    let (parameters, defaults) = parameters.into_parts();

    Some(FunctionSignature {
        name: name.to_string(),
        parameters,
        defaults,
        return_annotation,
        decorators,
        is_async: function.is_async(),
    })
}

/// 提取类信息，私有类返回 `None`
fn extract_class(node: Node, source: &str) -> Option<ClassInfo> {
    let name = node_text(node.child_by_field_name("name")?, source);
    if !is_public_class_name(name) {
        return None;
    }

    let bases = node
        .child_by_field_name("superclasses")
        .map(|arguments| {
            named_children(arguments)
                .into_iter()
                .filter(|arg| !matches!(arg.kind(), "keyword_argument" | "dictionary_splat"))
                .map(|arg| expression_text(arg, source))
                .collect()
        })
        .unwrap_or_default();

    let mut class = ClassInfo {
        name: name.to_string(),
        bases,
        ..Default::default()
    };

    let Some(body) = node.child_by_field_name("body") else {
        return Some(class);
    };

    for child in named_children(body) {
        match Statement::classify(child) {
            Statement::Function(function) => {
                if let Some(method) = extract_function(&function, source) {
                    class.methods.insert(method.name.clone(), method);
                }
            }
            Statement::Assignment(assignment) => {
                if let Some(var_name) = annotated_name(assignment, source) {
                    class.class_vars.push(var_name.to_string());
                }
            }
            _ => {}
        }
    }

    Some(class)
}

/// 带类型注解的简单名称声明 (`name: T` 或 `name: T = value`)
fn annotated_name<'s>(assignment: Node, source: &'s str) -> Option<&'s str> {
    assignment.child_by_field_name("type")?;
    let left = assignment.child_by_field_name("left")?;
    (left.kind() == "identifier").then(|| node_text(left, source))
}

/// 字符串字面量的值，f-string 与 bytes 字面量返回 `None`
fn string_literal_value(node: Node, source: &str) -> Option<String> {
    match node.kind() {
        "string" => {
            let mut value = String::new();
            let mut cursor = node.walk();
            for child in node.children(&mut cursor) {
                match child.kind() {
                    "string_start" => {
                        let prefix = node_text(child, source).to_ascii_lowercase();
                        if prefix.contains('f') || prefix.contains('b') {
                            return None;
                        }
                    }
                    "string_content" => value.push_str(node_text(child, source)),
                    "interpolation" => return None,
                    _ => {}
                }
            }
            Some(value)
        }
        "concatenated_string" => named_children(node)
            .into_iter()
            .map(|part| string_literal_value(part, source))
            .collect(),
        _ => None,
    }
}

/// 按 Python 参数种类分组的参数列表
#[derive(Debug, Default)]
struct ParameterList {
    positional_only: Vec<String>,
    positional: Vec<String>,
    var_positional: Option<String>,
    keyword_only: Vec<String>,
    var_keyword: Option<String>,
    defaults: Vec<String>,
    after_star: bool,
}

impl ParameterList {
    fn collect(parameters: Node, source: &str) -> Self {
        let mut list = Self::default();

        for param in named_children(parameters) {
            match param.kind() {
                "identifier" => list.push_named(node_text(param, source), None),
                "typed_parameter" => {
                    let annotation = param
                        .child_by_field_name("type")
                        .map(|node| expression_text(node, source));
                    let Some(target) = named_children(param).into_iter().next() else {
                        continue;
                    };
                    match target.kind() {
                        "list_splat_pattern" => list.push_var_positional(target, source, annotation),
                        "dictionary_splat_pattern" => {
                            list.push_var_keyword(target, source, annotation)
                        }
                        _ => list.push_named(node_text(target, source), annotation),
                    }
                }
                "default_parameter" | "typed_default_parameter" => {
                    let Some(name) = param.child_by_field_name("name") else {
                        continue;
                    };
                    let annotation = param
                        .child_by_field_name("type")
                        .map(|node| expression_text(node, source));
                    if !list.after_star {
                        if let Some(value) = param.child_by_field_name("value") {
                            list.defaults.push(expression_text(value, source));
                        }
                    }
                    list.push_named(node_text(name, source), annotation);
                }
                "list_splat_pattern" => list.push_var_positional(param, source, None),
                "dictionary_splat_pattern" => list.push_var_keyword(param, source, None),
                "keyword_separator" => list.after_star = true,
                "positional_separator" => {
                    let positional = std::mem::take(&mut list.positional);
                    list.positional_only.extend(positional);
                }
                _ => {}
            }
        }

        list
    }

    fn push_named(&mut self, name: &str, annotation: Option<String>) {
        let entry = render_parameter(name, annotation);
        if self.after_star {
            self.keyword_only.push(entry);
        } else {
            self.positional.push(entry);
        }
    }

    fn push_var_positional(&mut self, splat: Node, source: &str, annotation: Option<String>) {
        let name = splat_name(splat, source);
        self.var_positional = Some(render_parameter(&format!("*{name}"), annotation));
        self.after_star = true;
    }

    fn push_var_keyword(&mut self, splat: Node, source: &str, annotation: Option<String>) {
        let name = splat_name(splat, source);
        self.var_keyword = Some(render_parameter(&format!("**{name}"), annotation));
    }

    /// 按声明顺序展开为参数条目和默认值
    fn into_parts(self) -> (Vec<String>, Vec<String>) {
        let mut parameters = self.positional_only;
        if !parameters.is_empty() {
            parameters.push(POSITIONAL_ONLY_MARKER.to_string());
        }
        parameters.extend(self.positional);

        match self.var_positional {
            Some(var_positional) => parameters.push(var_positional),
            None if !self.keyword_only.is_empty() => {
                parameters.push(KEYWORD_ONLY_MARKER.to_string())
            }
            None => {}
        }

        parameters.extend(self.keyword_only);
        parameters.extend(self.var_keyword);

        (parameters, self.defaults)
    }
}

fn splat_name<'s>(splat: Node, source: &'s str) -> &'s str {
    named_children(splat)
        .into_iter()
        .next()
        .map(|name| node_text(name, source))
        .unwrap_or("")
}

fn render_parameter(name: &str, annotation: Option<String>) -> String {
    match annotation {
        Some(annotation) => format!("{name}: {annotation}"),
        None => name.to_string(),
    }
}

//! 公共 API 快照的数据模型
//!
//! 描述某个模块在某个版本下的公共接口：函数签名、类、`__all__` 导出以及重新导出的名称。
//! 所有类型在提取完成后都不再修改。

use serde::Serialize;
use std::collections::BTreeMap;

/// 仅接受位置参数的分隔标记 (`/`)
pub const POSITIONAL_ONLY_MARKER: &str = "/";

/// 没有 `*args` 时，标记仅限关键字参数开始的哨兵 (`*`)
pub const KEYWORD_ONLY_MARKER: &str = "*";

/// 函数签名信息
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct FunctionSignature {
    pub name: String,
    /// 参数列表，按声明顺序，`*args`、`*`、`**kwargs` 均为独立条目
    pub parameters: Vec<String>,
    /// 位置参数默认值的源码文本，按声明顺序排列，与参数列表末尾对齐
    pub defaults: Vec<String>,
    pub return_annotation: Option<String>,
    pub decorators: Vec<String>,
    pub is_async: bool,
}

impl FunctionSignature {
    /// 渲染为 `name(p1, p2, ...)` 形式的签名文本
    pub fn signature_text(&self) -> String {
        format!("{}({})", self.name, self.parameters.join(", "))
    }

    /// 将默认值与其绑定的位置参数配对
    ///
    /// `defaults` 只记录了一个扁平的尾部序列，这里把它与 `*args`/`*` 之前的最后 N 个
    /// 位置参数对齐。差异计算不使用该结果，比较始终基于 `parameters`。
    pub fn defaults_by_parameter(&self) -> Vec<(&str, &str)> {
        let positional: Vec<&str> = self
            .parameters
            .iter()
            .map(String::as_str)
            .take_while(|param| *param != KEYWORD_ONLY_MARKER && !param.starts_with('*'))
            .filter(|param| *param != POSITIONAL_ONLY_MARKER)
            .map(parameter_name)
            .collect();

        let skip = positional.len().saturating_sub(self.defaults.len());
        positional
            .into_iter()
            .skip(skip)
            .zip(self.defaults.iter().map(String::as_str))
            .collect()
    }
}

/// 去掉参数条目中的类型注解部分
fn parameter_name(param: &str) -> &str {
    param.split_once(':').map_or(param, |(name, _)| name.trim_end())
}

/// 类信息
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ClassInfo {
    pub name: String,
    pub bases: Vec<String>,
    /// 直接定义在类体中的方法，不包含继承而来的方法
    pub methods: BTreeMap<String, FunctionSignature>,
    pub class_vars: Vec<String>,
}

/// 模块公共 API 快照
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ModuleInfo {
    /// 点分隔的逻辑模块名，由快照构建器填写
    pub name: String,
    pub functions: BTreeMap<String, FunctionSignature>,
    pub classes: BTreeMap<String, ClassInfo>,
    /// `__all__` 中的名称，保留顺序与重复项
    pub exports: Vec<String>,
    pub re_exports: Vec<String>,
}

/// 函数名是否属于公共 API：单下划线开头的私有名称被排除，双下划线开头的名称保留
pub fn is_public_function_name(name: &str) -> bool {
    !name.starts_with('_') || name.starts_with("__")
}

/// 类名是否属于公共 API：任何下划线开头的类名都被排除
pub fn is_public_class_name(name: &str) -> bool {
    !name.starts_with('_')
}

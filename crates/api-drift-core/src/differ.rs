//! 公共 API 差异计算模块
//!
//! 比较同一逻辑模块的两个快照，生成分类后的变更记录。
//! 所有比较都基于规范化字段的结构相等，集合差异按名称排序输出。

use crate::model::{ClassInfo, FunctionSignature, ModuleInfo};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// 变更类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    Added,
    Removed,
    Modified,
}

impl ChangeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeType::Added => "added",
            ChangeType::Removed => "removed",
            ChangeType::Modified => "modified",
        }
    }
}

/// 变更实体的类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeCategory {
    Module,
    Function,
    Class,
    ClassVar,
    Export,
}

impl ChangeCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeCategory::Module => "module",
            ChangeCategory::Function => "function",
            ChangeCategory::Class => "class",
            ChangeCategory::ClassVar => "class_var",
            ChangeCategory::Export => "export",
        }
    }
}

/// 变更详情，不同类别与类型对应不同的字段
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ChangeDetails {
    /// 新增函数
    AddedFunction {
        signature: String,
        params: Vec<String>,
        #[serde(rename = "return")]
        return_annotation: Option<String>,
        decorators: Vec<String>,
    },
    /// 新增类
    AddedClass {
        bases: Vec<String>,
        methods: Vec<String>,
        class_vars: Vec<String>,
    },
    /// 参数列表变化
    SignatureChanged {
        old_params: Vec<String>,
        new_params: Vec<String>,
        old_signature: String,
        new_signature: String,
    },
    /// 参数不变，仅返回类型注解变化
    ReturnChanged {
        old_return: Option<String>,
        new_return: Option<String>,
    },
    /// 无附加信息，序列化为 `{}`
    Empty {},
}

impl ChangeDetails {
    fn added_function(func: &FunctionSignature) -> Self {
        ChangeDetails::AddedFunction {
            signature: func.signature_text(),
            params: func.parameters.clone(),
            return_annotation: func.return_annotation.clone(),
            decorators: func.decorators.clone(),
        }
    }

    fn added_class(class: &ClassInfo) -> Self {
        ChangeDetails::AddedClass {
            bases: class.bases.clone(),
            methods: class.methods.keys().cloned().collect(),
            class_vars: class.class_vars.clone(),
        }
    }
}

/// 单条 API 变更记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeRecord {
    #[serde(rename = "type")]
    pub change_type: ChangeType,
    pub category: ChangeCategory,
    #[serde(rename = "module")]
    pub module_name: String,
    /// 嵌套实体使用 `Class.member` 形式的组合名
    #[serde(rename = "name")]
    pub entity_name: String,
    pub details: ChangeDetails,
}

impl ChangeRecord {
    /// 创建没有附加详情的变更记录
    pub fn new(
        change_type: ChangeType,
        category: ChangeCategory,
        module_name: &str,
        entity_name: impl Into<String>,
    ) -> Self {
        Self {
            change_type,
            category,
            module_name: module_name.to_string(),
            entity_name: entity_name.into(),
            details: ChangeDetails::Empty {},
        }
    }

    /// 设置变更详情
    pub fn with_details(mut self, details: ChangeDetails) -> Self {
        self.details = details;
        self
    }
}

/// 比较同一模块在两个版本的快照
///
/// - 旧版不存在、新版存在：模块新增，并为每个顶层函数和类生成新增记录
/// - 旧版存在、新版不存在：只生成一条模块删除记录
/// - 两者都不存在：不生成记录
pub fn diff_modules(
    module_name: &str,
    old: Option<&ModuleInfo>,
    new: Option<&ModuleInfo>,
) -> Vec<ChangeRecord> {
    match (old, new) {
        (None, Some(new)) => added_module(module_name, new),
        (Some(_), None) => vec![ChangeRecord::new(
            ChangeType::Removed,
            ChangeCategory::Module,
            module_name,
            module_name,
        )],
        (Some(old), Some(new)) => {
            let mut changes = diff_functions(&old.functions, &new.functions, module_name, None);
            changes.extend(diff_classes(&old.classes, &new.classes, module_name));
            changes.extend(diff_exports(&old.exports, &new.exports, module_name));
            changes
        }
        (None, None) => Vec::new(),
    }
}

fn added_module(module_name: &str, new: &ModuleInfo) -> Vec<ChangeRecord> {
    let mut changes = vec![ChangeRecord::new(
        ChangeType::Added,
        ChangeCategory::Module,
        module_name,
        module_name,
    )];

    changes.extend(new.functions.iter().map(|(name, func)| {
        ChangeRecord::new(ChangeType::Added, ChangeCategory::Function, module_name, name)
            .with_details(ChangeDetails::added_function(func))
    }));
    changes.extend(new.classes.iter().map(|(name, class)| {
        ChangeRecord::new(ChangeType::Added, ChangeCategory::Class, module_name, name)
            .with_details(ChangeDetails::added_class(class))
    }));

    changes
}

/// 比较函数集合
///
/// `owner` 为类名时比较的是方法，记录名为 `Class.method`。
/// 同名函数先比较参数列表，参数不同时只报告参数变化；参数相同才比较返回类型注解。
pub fn diff_functions(
    old: &BTreeMap<String, FunctionSignature>,
    new: &BTreeMap<String, FunctionSignature>,
    module_name: &str,
    owner: Option<&str>,
) -> Vec<ChangeRecord> {
    let qualified = |name: &str| match owner {
        Some(owner) => format!("{owner}.{name}"),
        None => name.to_string(),
    };

    let mut changes: Vec<ChangeRecord> = new
        .iter()
        .filter(|(name, _)| !old.contains_key(*name))
        .map(|(name, func)| {
            ChangeRecord::new(
                ChangeType::Added,
                ChangeCategory::Function,
                module_name,
                qualified(name),
            )
            .with_details(ChangeDetails::added_function(func))
        })
        .collect();

    changes.extend(old.keys().filter(|name| !new.contains_key(*name)).map(|name| {
        ChangeRecord::new(
            ChangeType::Removed,
            ChangeCategory::Function,
            module_name,
            qualified(name),
        )
    }));

    for (name, old_func) in old {
        let Some(new_func) = new.get(name) else {
            continue;
        };

        let details = if old_func.parameters != new_func.parameters {
            ChangeDetails::SignatureChanged {
                old_params: old_func.parameters.clone(),
                new_params: new_func.parameters.clone(),
                old_signature: old_func.signature_text(),
                new_signature: new_func.signature_text(),
            }
        } else if old_func.return_annotation != new_func.return_annotation {
            ChangeDetails::ReturnChanged {
                old_return: old_func.return_annotation.clone(),
                new_return: new_func.return_annotation.clone(),
            }
        } else {
            continue;
        };

        changes.push(
            ChangeRecord::new(
                ChangeType::Modified,
                ChangeCategory::Function,
                module_name,
                qualified(name),
            )
            .with_details(details),
        );
    }

    changes
}

/// 比较类集合，同名类递归比较方法与类变量
pub fn diff_classes(
    old: &BTreeMap<String, ClassInfo>,
    new: &BTreeMap<String, ClassInfo>,
    module_name: &str,
) -> Vec<ChangeRecord> {
    let mut changes: Vec<ChangeRecord> = new
        .iter()
        .filter(|(name, _)| !old.contains_key(*name))
        .map(|(name, class)| {
            ChangeRecord::new(ChangeType::Added, ChangeCategory::Class, module_name, name)
                .with_details(ChangeDetails::added_class(class))
        })
        .collect();

    changes.extend(
        old.keys()
            .filter(|name| !new.contains_key(*name))
            .map(|name| {
                ChangeRecord::new(ChangeType::Removed, ChangeCategory::Class, module_name, name)
            }),
    );

    for (name, old_class) in old {
        let Some(new_class) = new.get(name) else {
            continue;
        };

        changes.extend(diff_functions(
            &old_class.methods,
            &new_class.methods,
            module_name,
            Some(name),
        ));

        let (added, removed) = set_difference(&old_class.class_vars, &new_class.class_vars);
        changes.extend(added.into_iter().map(|var| {
            ChangeRecord::new(
                ChangeType::Added,
                ChangeCategory::ClassVar,
                module_name,
                format!("{name}.{var}"),
            )
        }));
        changes.extend(removed.into_iter().map(|var| {
            ChangeRecord::new(
                ChangeType::Removed,
                ChangeCategory::ClassVar,
                module_name,
                format!("{name}.{var}"),
            )
        }));
    }

    changes
}

/// 比较 `__all__` 导出列表，按集合处理
pub fn diff_exports(old: &[String], new: &[String], module_name: &str) -> Vec<ChangeRecord> {
    let (added, removed) = set_difference(old, new);

    let mut changes: Vec<ChangeRecord> = added
        .into_iter()
        .map(|name| ChangeRecord::new(ChangeType::Added, ChangeCategory::Export, module_name, name))
        .collect();
    changes.extend(removed.into_iter().map(|name| {
        ChangeRecord::new(ChangeType::Removed, ChangeCategory::Export, module_name, name)
    }));

    changes
}

/// 返回（仅在新集合中，仅在旧集合中）的名称，均按名称排序
fn set_difference<'a>(old: &'a [String], new: &'a [String]) -> (Vec<&'a str>, Vec<&'a str>) {
    let old: BTreeSet<&str> = old.iter().map(String::as_str).collect();
    let new: BTreeSet<&str> = new.iter().map(String::as_str).collect();

    (
        new.difference(&old).copied().collect(),
        old.difference(&new).copied().collect(),
    )
}

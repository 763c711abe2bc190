//! 语法树导航辅助函数与表达式文本规范化

use tree_sitter::Node;

/// 获取节点的源码文本
pub fn node_text<'a>(node: Node, source: &'a str) -> &'a str {
    source.get(node.byte_range()).unwrap_or("")
}

/// 查找直接子节点中指定类型的节点
pub fn find_child_by_kind<'a>(node: Node<'a>, kind: &str) -> Option<Node<'a>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).find(|child| child.kind() == kind)
}

/// 收集所有具名子节点，跳过注释
pub fn named_children<'a>(node: Node<'a>) -> Vec<Node<'a>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| child.kind() != "comment")
        .collect()
}

/// 获取节点的规范化表达式文本
pub fn expression_text(node: Node, source: &str) -> String {
    render_expression(node_text(node, source))
}

/// 将表达式源码规范化为稳定的单行文本
///
/// 去掉注释和换行，空白压缩为单个空格，括号内侧不留空格，逗号后恰好一个空格。
/// `]` 与 `}` 前的尾随逗号被删除；`)` 前的尾随逗号只在括号内还有其他逗号时删除，
/// 单元素元组 `(x,)` 保持不变。字符串字面量原样保留，包括引号风格。
pub fn render_expression(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;
    // 每层未闭合括号内的顶层逗号数
    let mut commas: Vec<usize> = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '"' | '\'' => {
                push_pending_space(&mut out, &mut pending_space);
                i = copy_string_literal(&chars, i, &mut out);
                continue;
            }
            '#' => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
                pending_space = true;
                continue;
            }
            '\\' if chars.get(i + 1).is_some_and(|next| *next == '\n' || *next == '\r') => {
                pending_space = true;
            }
            c if c.is_whitespace() => {
                pending_space = true;
            }
            ',' => {
                if let Some(count) = commas.last_mut() {
                    *count += 1;
                }
                out.push(',');
                pending_space = true;
            }
            ')' | ']' | '}' => {
                let count = commas.pop().unwrap_or(0);
                if out.ends_with(',') && (c != ')' || count >= 2) {
                    out.pop();
                }
                out.push(c);
                pending_space = false;
            }
            '(' | '[' | '{' => {
                push_pending_space(&mut out, &mut pending_space);
                commas.push(0);
                out.push(c);
                pending_space = false;
            }
            _ => {
                push_pending_space(&mut out, &mut pending_space);
                out.push(c);
            }
        }
        i += 1;
    }

    out
}

fn push_pending_space(out: &mut String, pending_space: &mut bool) {
    if *pending_space && !out.is_empty() && !out.ends_with(['(', '[', '{']) {
        out.push(' ');
    }
    *pending_space = false;
}

/// 复制从 `start` 开始的字符串字面量，返回字面量之后的位置
fn copy_string_literal(chars: &[char], start: usize, out: &mut String) -> usize {
    let quote = chars[start];
    let triple = chars.get(start + 1) == Some(&quote) && chars.get(start + 2) == Some(&quote);
    let delimiter_len = if triple { 3 } else { 1 };

    for c in &chars[start..start + delimiter_len] {
        out.push(*c);
    }

    let mut i = start + delimiter_len;
    while i < chars.len() {
        let c = chars[i];
        if c == '\\' {
            out.push(c);
            if let Some(escaped) = chars.get(i + 1) {
                out.push(*escaped);
            }
            i += 2;
            continue;
        }
        if c == quote
            && (!triple
                || (chars.get(i + 1) == Some(&quote) && chars.get(i + 2) == Some(&quote)))
        {
            for c in &chars[i..i + delimiter_len] {
                out.push(*c);
            }
            return i + delimiter_len;
        }
        out.push(c);
        i += 1;
    }

    i
}

//! HTML 节点树
//!
//! html5ever 解析出的 rcdom 带有 `Rc<RefCell<..>>`，这里一次性转换成只读的
//! 自有树，后续的渲染和抽取都在这棵树上进行。

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData, RcDom};

/// 解析后的 HTML 节点
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawNode {
    /// 普通元素（标签名为小写的 local name）
    Tag {
        name: String,
        attributes: Vec<(String, String)>,
        children: Vec<RawNode>,
    },
    /// 文本节点（原样保留，不做裁剪）
    Text(String),
    /// `<script>` 元素
    Script(Vec<RawNode>),
}

impl RawNode {
    /// 解析 HTML 字符串，返回 `<html>` 根元素
    pub fn parse_html(html: &str) -> RawNode {
        let dom = parse_document(RcDom::default(), Default::default()).one(html);
        let root = dom
            .document
            .children
            .borrow()
            .iter()
            .filter_map(convert)
            .find(|node| node.is_tag("html"));

        root.unwrap_or_else(|| RawNode::tag("html", &[], Vec::new()))
    }

    /// 构造元素节点
    pub fn tag(name: &str, attributes: &[(&str, &str)], children: Vec<RawNode>) -> RawNode {
        RawNode::Tag {
            name: name.to_string(),
            attributes: attributes
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            children,
        }
    }

    /// 构造文本节点
    pub fn text(content: &str) -> RawNode {
        RawNode::Text(content.to_string())
    }

    /// 标签名，文本节点没有
    pub fn name(&self) -> Option<&str> {
        match self {
            RawNode::Tag { name, .. } => Some(name),
            RawNode::Script(_) => Some("script"),
            RawNode::Text(_) => None,
        }
    }

    pub fn is_tag(&self, tag: &str) -> bool {
        self.name() == Some(tag)
    }

    pub fn is_element(&self) -> bool {
        !matches!(self, RawNode::Text(_))
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        match self {
            RawNode::Tag { attributes, .. } => attributes
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str()),
            _ => None,
        }
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or_default().split_whitespace()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    pub fn children(&self) -> &[RawNode] {
        match self {
            RawNode::Tag { children, .. } | RawNode::Script(children) => children,
            RawNode::Text(_) => &[],
        }
    }

    /// 元素子节点（跳过文本）
    pub fn element_children(&self) -> impl Iterator<Item = &RawNode> {
        self.children().iter().filter(|child| child.is_element())
    }

    /// 深度优先查找第一个满足条件的后代节点（不含自身）
    pub fn find_first<F>(&self, predicate: F) -> Option<&RawNode>
    where
        F: Fn(&RawNode) -> bool + Copy,
    {
        for child in self.children() {
            if predicate(child) {
                return Some(child);
            }
            if let Some(found) = child.find_first(predicate) {
                return Some(found);
            }
        }
        None
    }

    /// 按文档顺序收集所有满足条件的后代节点（不含自身）
    pub fn find_all<F>(&self, predicate: F) -> Vec<&RawNode>
    where
        F: Fn(&RawNode) -> bool + Copy,
    {
        let mut found = Vec::new();
        self.collect_matching(predicate, &mut found);
        found
    }

    fn collect_matching<'a, F>(&'a self, predicate: F, found: &mut Vec<&'a RawNode>)
    where
        F: Fn(&RawNode) -> bool + Copy,
    {
        for child in self.children() {
            if predicate(child) {
                found.push(child);
            }
            child.collect_matching(predicate, found);
        }
    }

    /// 所有后代文本拼接，空白折叠为单个空格
    pub fn text_content(&self) -> String {
        let mut raw = String::new();
        self.collect_text(&mut raw);
        raw.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            RawNode::Text(content) => {
                out.push_str(content);
                out.push(' ');
            }
            _ => {
                for child in self.children() {
                    child.collect_text(out);
                }
            }
        }
    }
}

fn convert(handle: &Handle) -> Option<RawNode> {
    match &handle.data {
        NodeData::Text { contents } => Some(RawNode::Text(contents.borrow().to_string())),
        NodeData::Element { name, attrs, .. } => {
            let tag = name.local.as_ref().to_string();
            let children: Vec<RawNode> = handle.children.borrow().iter().filter_map(convert).collect();
            if tag == "script" {
                return Some(RawNode::Script(children));
            }
            let attributes = attrs
                .borrow()
                .iter()
                .map(|attr| (attr.name.local.as_ref().to_string(), attr.value.to_string()))
                .collect();
            Some(RawNode::Tag {
                name: tag,
                attributes,
                children,
            })
        }
        // 注释、doctype 等直接丢弃
        _ => None,
    }
}

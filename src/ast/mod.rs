//! The abstract syntax tree produced by [`parse()`](crate::parse).
//!
//! Every declaration records its source range in a [`Meta`], the comments placed directly
//! before it, and at most one comment on the same line as its terminator. Block declarations
//! additionally record a comment placed on the same line as their opening brace.
//!
//! Block bodies are kept in source order as a list of the block's element type.

use std::{fmt, sync::Arc};

mod visit;

pub use self::visit::Visitor;

/// The file name used when none is configured.
pub const DEFAULT_FILENAME: &str = "<input>";

/// A location in the source file.
///
/// Lines and columns are 1-based, the offset is a 0-based byte offset. Columns count unicode
/// code points, not bytes.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Position {
    /// The name of the file the position belongs to.
    pub filename: Arc<str>,
    /// The byte offset from the start of the file.
    pub offset: usize,
    /// The line number, starting at 1.
    pub line: usize,
    /// The column number, starting at 1.
    pub column: usize,
}

/// The source range of a node.
///
/// `last` is the position of the node's terminator (`;` or `}`), or of its last token for nodes
/// without one.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Meta {
    /// Where the node starts.
    pub start: Position,
    /// Where the node's last token starts.
    pub last: Position,
}

/// A `//` or `/* */` comment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Comment {
    /// The comment text, including its delimiters.
    pub raw: String,
    /// `last` is the position of the comment's final character.
    pub meta: Meta,
}

/// A parsed `.proto` file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Proto {
    /// The mandatory `syntax = "proto3";` statement.
    pub syntax: Syntax,
    /// Every declaration after the syntax statement, in source order.
    pub body: Vec<ProtoElement>,
    /// Spans from the syntax statement to the last top-level declaration.
    pub meta: Meta,
}

/// A top-level declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProtoElement {
    /// An `import` statement.
    Import(Import),
    /// A `package` statement.
    Package(Package),
    /// A file-level `option`.
    Option(Option),
    /// A message definition.
    Message(Message),
    /// An enum definition.
    Enum(Enum),
    /// A service definition.
    Service(Service),
    /// An `extend` block.
    Extend(Extend),
    /// A comment following the last declaration, kept only when body comments are enabled.
    Comment(Comment),
}

/// `syntax = "proto3";`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Syntax {
    /// Always `proto3`.
    pub version: String,
    /// Leading comments.
    pub comments: Vec<Comment>,
    /// The comment on the same line after the `;`.
    pub inline_comment: std::option::Option<Comment>,
    /// Source range.
    pub meta: Meta,
}

/// The modifier of an [`Import`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ImportKind {
    /// `import weak`
    Weak,
    /// `import public`
    Public,
}

/// `import [weak|public] "path";`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Import {
    /// The modifier, if any.
    pub kind: std::option::Option<ImportKind>,
    /// The imported path, verbatim including its quotes.
    pub location: String,
    /// Leading comments.
    pub comments: Vec<Comment>,
    /// The comment on the same line after the `;`.
    pub inline_comment: std::option::Option<Comment>,
    /// Source range.
    pub meta: Meta,
}

/// `package a.b.c;`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Package {
    /// The dotted package name.
    pub name: String,
    /// Leading comments.
    pub comments: Vec<Comment>,
    /// The comment on the same line after the `;`.
    pub inline_comment: std::option::Option<Comment>,
    /// Source range.
    pub meta: Meta,
}

/// `option name = constant;`
///
/// When the parser runs in permissive mode the right-hand side may be a message literal. In that
/// case `constant` is empty and `endpoint` holds the structured value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Option {
    /// The option name, e.g. `java_package` or `(my_option).a`.
    pub name: String,
    /// The constant as written, e.g. `"com.example.foo"` or `-1.5`.
    pub constant: String,
    /// The structured value of a `google.api.http` style literal.
    pub endpoint: std::option::Option<CloudEndpoint>,
    /// Leading comments.
    pub comments: Vec<Comment>,
    /// The comment on the same line after the `;`.
    pub inline_comment: std::option::Option<Comment>,
    /// Source range.
    pub meta: Meta,
}

/// A Cloud Endpoints message literal, `{ get: "/v1/foo" body: "*" }`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CloudEndpoint {
    /// The `name: value` pairs, in source order.
    pub fields: Vec<EndpointFieldOption>,
    /// The `additional_bindings { ... }` blocks, in source order.
    pub additional_bindings: Vec<AdditionalBinding>,
}

/// A single `name: value` pair of a [`CloudEndpoint`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EndpointFieldOption {
    /// The field name.
    pub name: String,
    /// The value as written; nested literals are rendered as `{k:v,}`.
    pub constant: String,
    /// Source range.
    pub meta: Meta,
}

/// An `additional_bindings { ... }` block of a [`CloudEndpoint`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdditionalBinding {
    /// The `name: value` pairs of the binding.
    pub fields: Vec<EndpointFieldOption>,
    /// Source range, from `additional_bindings` to the closing `}`.
    pub meta: Meta,
}

/// An option in the `[...]` list of a field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldOption {
    /// The option name.
    pub name: String,
    /// The constant as written. Permissive `{...}` values are stored with whitespace removed.
    pub constant: String,
}

/// `[repeated|optional] type name = number [options];`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Field {
    /// Whether the field is `repeated`.
    pub repeated: bool,
    /// Whether the field has explicit presence (`optional`).
    pub optional: bool,
    /// A scalar type name or a message/enum type reference.
    pub ty: String,
    /// The field name.
    pub name: String,
    /// The field number as written.
    pub number: String,
    /// The `[...]` options.
    pub options: Vec<FieldOption>,
    /// Leading comments.
    pub comments: Vec<Comment>,
    /// The comment on the same line after the `;`.
    pub inline_comment: std::option::Option<Comment>,
    /// Source range.
    pub meta: Meta,
}

/// `map<key, value> name = number [options];`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MapField {
    /// The key type; always an integral type, `bool` or `string`.
    pub key_ty: String,
    /// The value type.
    pub ty: String,
    /// The field name.
    pub name: String,
    /// The field number as written.
    pub number: String,
    /// The `[...]` options.
    pub options: Vec<FieldOption>,
    /// Leading comments.
    pub comments: Vec<Comment>,
    /// The comment on the same line after the `;`.
    pub inline_comment: std::option::Option<Comment>,
    /// Source range.
    pub meta: Meta,
}

/// `oneof name { ... }`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Oneof {
    /// The oneof name.
    pub name: String,
    /// The fields and options of the oneof, in source order.
    pub body: Vec<OneofElement>,
    /// Leading comments.
    pub comments: Vec<Comment>,
    /// The comment on the same line after the `}`.
    pub inline_comment: std::option::Option<Comment>,
    /// The comment on the same line after the `{`.
    pub inline_comment_behind_left_curly: std::option::Option<Comment>,
    /// Source range.
    pub meta: Meta,
}

/// An element of a [`Oneof`] body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OneofElement {
    /// A oneof member.
    Field(OneofField),
    /// An `option` statement.
    Option(Option),
    /// A trailing comment, kept only when body comments are enabled.
    Comment(Comment),
}

/// `type name = number [options];` inside a [`Oneof`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OneofField {
    /// A scalar type name or a message/enum type reference.
    pub ty: String,
    /// The field name.
    pub name: String,
    /// The field number as written.
    pub number: String,
    /// The `[...]` options.
    pub options: Vec<FieldOption>,
    /// Leading comments.
    pub comments: Vec<Comment>,
    /// The comment on the same line after the `;`.
    pub inline_comment: std::option::Option<Comment>,
    /// Source range.
    pub meta: Meta,
}

/// An option in the `[...]` list of an enum value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnumValueOption {
    /// The option name.
    pub name: String,
    /// The constant as written.
    pub constant: String,
}

/// `NAME = number [options];` inside an [`Enum`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnumField {
    /// The value name.
    pub name: String,
    /// The number as written, including a leading `-`.
    pub number: String,
    /// The `[...]` options.
    pub options: Vec<EnumValueOption>,
    /// Leading comments.
    pub comments: Vec<Comment>,
    /// The comment on the same line after the `;`.
    pub inline_comment: std::option::Option<Comment>,
    /// Source range.
    pub meta: Meta,
}

/// `enum Name { ... }`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Enum {
    /// The enum name.
    pub name: String,
    /// The values, options and reservations of the enum, in source order.
    pub body: Vec<EnumElement>,
    /// Leading comments.
    pub comments: Vec<Comment>,
    /// The comment on the same line after the `}`.
    pub inline_comment: std::option::Option<Comment>,
    /// The comment on the same line after the `{`.
    pub inline_comment_behind_left_curly: std::option::Option<Comment>,
    /// Source range.
    pub meta: Meta,
}

/// An element of an [`Enum`] body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EnumElement {
    /// An `option` statement.
    Option(Option),
    /// An enum value.
    Field(EnumField),
    /// A `reserved` statement.
    Reserved(Reserved),
    /// A trailing comment, kept only when body comments are enabled.
    Comment(Comment),
}

/// `message Name { ... }`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    /// The message name.
    pub name: String,
    /// The message body, in source order.
    pub body: Vec<BodyElement>,
    /// Leading comments.
    pub comments: Vec<Comment>,
    /// The comment on the same line after the `}`.
    pub inline_comment: std::option::Option<Comment>,
    /// The comment on the same line after the `{`.
    pub inline_comment_behind_left_curly: std::option::Option<Comment>,
    /// Source range.
    pub meta: Meta,
}

/// An element of a [`Message`] body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BodyElement {
    /// A normal field.
    Field(Field),
    /// A nested enum.
    Enum(Enum),
    /// A nested message.
    Message(Message),
    /// An `option` statement.
    Option(Option),
    /// A `oneof` block.
    Oneof(Oneof),
    /// A map field.
    MapField(MapField),
    /// A `reserved` statement.
    Reserved(Reserved),
    /// A nested `extend` block.
    Extend(Extend),
    /// A trailing comment, kept only when body comments are enabled.
    Comment(Comment),
}

/// `extend Type { ... }`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Extend {
    /// The extended message type.
    pub message_type: String,
    /// The extension fields, in source order.
    pub body: Vec<ExtendElement>,
    /// Leading comments.
    pub comments: Vec<Comment>,
    /// The comment on the same line after the `}`.
    pub inline_comment: std::option::Option<Comment>,
    /// The comment on the same line after the `{`.
    pub inline_comment_behind_left_curly: std::option::Option<Comment>,
    /// Source range.
    pub meta: Meta,
}

/// An element of an [`Extend`] body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExtendElement {
    /// An extension field.
    Field(Field),
    /// A trailing comment, kept only when body comments are enabled.
    Comment(Comment),
}

/// `service Name { ... }`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Service {
    /// The service name.
    pub name: String,
    /// The options and methods of the service, in source order.
    pub body: Vec<ServiceElement>,
    /// Leading comments.
    pub comments: Vec<Comment>,
    /// The comment on the same line after the `}`.
    pub inline_comment: std::option::Option<Comment>,
    /// The comment on the same line after the `{`.
    pub inline_comment_behind_left_curly: std::option::Option<Comment>,
    /// Source range.
    pub meta: Meta,
}

/// An element of a [`Service`] body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ServiceElement {
    /// An `option` statement.
    Option(Option),
    /// A method.
    Rpc(Rpc),
    /// A trailing comment, kept only when body comments are enabled.
    Comment(Comment),
}

/// The request or response of an [`Rpc`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RpcType {
    /// Whether the type is preceded by `stream`.
    pub streaming: bool,
    /// The message type reference.
    pub message_type: String,
}

/// `rpc Name (Request) returns (Response);` or with an option body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rpc {
    /// The method name.
    pub name: String,
    /// The request type.
    pub request: RpcType,
    /// The response type.
    pub response: RpcType,
    /// The options of the `{ ... }` body, if any.
    pub body: Vec<RpcElement>,
    /// Leading comments.
    pub comments: Vec<Comment>,
    /// The comment on the same line after the terminating `;` or `}`.
    pub inline_comment: std::option::Option<Comment>,
    /// The comment on the same line after the `{`.
    pub inline_comment_behind_left_curly: std::option::Option<Comment>,
    /// Source range.
    pub meta: Meta,
}

/// An element of an [`Rpc`] body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RpcElement {
    /// An `option` statement.
    Option(Option),
    /// A trailing comment, kept only when body comments are enabled.
    Comment(Comment),
}

/// `reserved 1, 2 to 5;` or `reserved "foo", "bar";`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reserved {
    /// What is reserved.
    pub kind: ReservedKind,
    /// Leading comments.
    pub comments: Vec<Comment>,
    /// The comment on the same line after the `;`.
    pub inline_comment: std::option::Option<Comment>,
    /// Source range.
    pub meta: Meta,
}

/// The contents of a [`Reserved`] statement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReservedKind {
    /// Reserved numbers.
    Ranges(Vec<Range>),
    /// Reserved names, verbatim including their quotes.
    FieldNames(Vec<String>),
}

/// A single number or an inclusive range of numbers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Range {
    /// The first number, as written.
    pub begin: String,
    /// The upper bound, if this is a `to` range.
    pub end: std::option::Option<RangeEnd>,
}

/// The upper bound of a [`Range`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RangeEnd {
    /// A number as written.
    Number(String),
    /// `max`
    Max,
}

impl Position {
    pub(crate) fn new(filename: Arc<str>) -> Self {
        Position {
            filename,
            offset: 0,
            line: 1,
            column: 1,
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Position {
            filename: DEFAULT_FILENAME.into(),
            offset: 0,
            line: 0,
            column: 0,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.filename, self.line, self.column)
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{} (offset {})",
            self.filename, self.line, self.column, self.offset
        )
    }
}

impl Meta {
    pub(crate) fn new(start: Position, last: Position) -> Self {
        Meta { start, last }
    }
}

impl Comment {
    /// Returns `true` for `/* */` comments.
    pub fn is_c_style(&self) -> bool {
        self.raw.starts_with("/*")
    }

    /// Returns the lines of the comment with the delimiters removed.
    pub fn lines(&self) -> Vec<&str> {
        if self.is_c_style() {
            let content = self.raw.trim_start_matches("/*");
            let content = content.strip_suffix("*/").unwrap_or(content);
            content.split('\n').collect()
        } else {
            vec![self.raw.trim_start_matches("//")]
        }
    }
}

macro_rules! element_meta {
    ($ty:ident { $($variant:ident),* $(,)? }) => {
        impl $ty {
            /// Returns the source range of the element.
            pub fn meta(&self) -> &Meta {
                match self {
                    $($ty::$variant(inner) => &inner.meta,)*
                }
            }
        }
    };
}

element_meta!(ProtoElement {
    Import, Package, Option, Message, Enum, Service, Extend, Comment
});
element_meta!(BodyElement {
    Field, Enum, Message, Option, Oneof, MapField, Reserved, Extend, Comment
});
element_meta!(EnumElement {
    Option, Field, Reserved, Comment
});
element_meta!(OneofElement {
    Field, Option, Comment
});
element_meta!(ExtendElement { Field, Comment });
element_meta!(ServiceElement { Option, Rpc, Comment });
element_meta!(RpcElement { Option, Comment });

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.begin)?;
        match &self.end {
            Some(RangeEnd::Number(end)) => write!(f, " to {}", end),
            Some(RangeEnd::Max) => write!(f, " to max"),
            None => Ok(()),
        }
    }
}

impl fmt::Display for Reserved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "reserved ")?;
        match &self.kind {
            ReservedKind::Ranges(ranges) => {
                for (index, range) in ranges.iter().enumerate() {
                    if index != 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", range)?;
                }
            }
            ReservedKind::FieldNames(names) => write!(f, "{}", names.join(", "))?,
        }
        write!(f, ";")
    }
}

impl CloudEndpoint {
    /// Renders the literal back to text as `{name:value,...}`.
    pub fn to_constant_string(&self) -> String {
        let mut result = String::from("{");
        for field in &self.fields {
            result.push_str(&field.name);
            result.push(':');
            result.push_str(&field.constant);
            result.push(',');
        }
        result.push('}');
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comment(raw: &str) -> Comment {
        Comment {
            raw: raw.to_owned(),
            meta: Meta::default(),
        }
    }

    #[test]
    fn comment_style() {
        assert!(comment("/*\ncomment\n*/\n").is_c_style());
        assert!(!comment("// comment").is_c_style());
    }

    #[test]
    fn comment_lines() {
        assert_eq!(comment("/*comment*/").lines(), vec!["comment"]);
        assert_eq!(
            comment("/* comment1\ncomment2\n*/").lines(),
            vec![" comment1", "comment2", ""]
        );
        assert_eq!(comment("// comment").lines(), vec![" comment"]);
    }

    #[test]
    fn position_display() {
        let mut pos = Position::new(DEFAULT_FILENAME.into());
        assert_eq!(pos.to_string(), "<input>:1:1");

        pos.filename = "test.proto".into();
        assert_eq!(pos.to_string(), "test.proto:1:1");
    }

    #[test]
    fn reserved_display() {
        let reserved = Reserved {
            kind: ReservedKind::Ranges(vec![
                Range {
                    begin: "1".to_owned(),
                    end: None,
                },
                Range {
                    begin: "5".to_owned(),
                    end: Some(RangeEnd::Number("10".to_owned())),
                },
                Range {
                    begin: "20".to_owned(),
                    end: Some(RangeEnd::Max),
                },
            ]),
            comments: vec![],
            inline_comment: None,
            meta: Meta::default(),
        };
        assert_eq!(reserved.to_string(), "reserved 1, 5 to 10, 20 to max;");
    }

    #[test]
    fn endpoint_constant_string() {
        let endpoint = CloudEndpoint {
            fields: vec![
                EndpointFieldOption {
                    name: "major".to_owned(),
                    constant: "1".to_owned(),
                    meta: Meta::default(),
                },
                EndpointFieldOption {
                    name: "minor".to_owned(),
                    constant: "7".to_owned(),
                    meta: Meta::default(),
                },
            ],
            additional_bindings: vec![],
        };
        assert_eq!(endpoint.to_constant_string(), "{major:1,minor:7,}");
    }
}

use crate::ast;

/// A callback for each kind of node in the tree.
///
/// Every method returns whether the children of the node should be visited. A node's comments
/// are visited after the node itself, followed by its body in declaration order.
pub trait Visitor {
    /// Called for every comment, including the leading and inline comments of other nodes.
    ///
    /// Comments have no children, so the return value is ignored.
    fn visit_comment(&mut self, _: &ast::Comment) -> bool {
        true
    }

    /// Called for the syntax statement.
    fn visit_syntax(&mut self, _: &ast::Syntax) -> bool {
        true
    }

    /// Called for each `import` statement.
    fn visit_import(&mut self, _: &ast::Import) -> bool {
        true
    }

    /// Called for the `package` statement.
    fn visit_package(&mut self, _: &ast::Package) -> bool {
        true
    }

    /// Called for each `option` statement, at any level.
    fn visit_option(&mut self, _: &ast::Option) -> bool {
        true
    }

    /// Called for each message.
    fn visit_message(&mut self, _: &ast::Message) -> bool {
        true
    }

    /// Called for each normal field, including extension fields.
    fn visit_field(&mut self, _: &ast::Field) -> bool {
        true
    }

    /// Called for each map field.
    fn visit_map_field(&mut self, _: &ast::MapField) -> bool {
        true
    }

    /// Called for each oneof.
    fn visit_oneof(&mut self, _: &ast::Oneof) -> bool {
        true
    }

    /// Called for each field of a oneof.
    fn visit_oneof_field(&mut self, _: &ast::OneofField) -> bool {
        true
    }

    /// Called for each enum.
    fn visit_enum(&mut self, _: &ast::Enum) -> bool {
        true
    }

    /// Called for each enum value.
    fn visit_enum_field(&mut self, _: &ast::EnumField) -> bool {
        true
    }

    /// Called for each `reserved` statement.
    fn visit_reserved(&mut self, _: &ast::Reserved) -> bool {
        true
    }

    /// Called for each `extend` block.
    fn visit_extend(&mut self, _: &ast::Extend) -> bool {
        true
    }

    /// Called for each service.
    fn visit_service(&mut self, _: &ast::Service) -> bool {
        true
    }

    /// Called for each method of a service.
    fn visit_rpc(&mut self, _: &ast::Rpc) -> bool {
        true
    }
}

fn accept_comments<V: Visitor + ?Sized>(
    comments: &[ast::Comment],
    inline_comments: &[&std::option::Option<ast::Comment>],
    visitor: &mut V,
) {
    for comment in comments {
        visitor.visit_comment(comment);
    }
    for comment in inline_comments.iter().copied().flatten() {
        visitor.visit_comment(comment);
    }
}

impl ast::Comment {
    /// Dispatches to [`Visitor::visit_comment`].
    pub fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) {
        visitor.visit_comment(self);
    }
}

impl ast::Proto {
    /// Visits the syntax statement followed by every top-level declaration.
    pub fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) {
        self.syntax.accept(visitor);
        for element in &self.body {
            element.accept(visitor);
        }
    }
}

impl ast::ProtoElement {
    /// Dispatches to the visitor method for the contained node.
    pub fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) {
        match self {
            ast::ProtoElement::Import(import) => import.accept(visitor),
            ast::ProtoElement::Package(package) => package.accept(visitor),
            ast::ProtoElement::Option(option) => option.accept(visitor),
            ast::ProtoElement::Message(message) => message.accept(visitor),
            ast::ProtoElement::Enum(enu) => enu.accept(visitor),
            ast::ProtoElement::Service(service) => service.accept(visitor),
            ast::ProtoElement::Extend(extend) => extend.accept(visitor),
            ast::ProtoElement::Comment(comment) => comment.accept(visitor),
        }
    }
}

impl ast::Syntax {
    /// Visits the statement and its comments.
    pub fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) {
        if visitor.visit_syntax(self) {
            accept_comments(&self.comments, &[&self.inline_comment], visitor);
        }
    }
}

impl ast::Import {
    /// Visits the statement and its comments.
    pub fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) {
        if visitor.visit_import(self) {
            accept_comments(&self.comments, &[&self.inline_comment], visitor);
        }
    }
}

impl ast::Package {
    /// Visits the statement and its comments.
    pub fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) {
        if visitor.visit_package(self) {
            accept_comments(&self.comments, &[&self.inline_comment], visitor);
        }
    }
}

impl ast::Option {
    /// Visits the statement and its comments.
    pub fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) {
        if visitor.visit_option(self) {
            accept_comments(&self.comments, &[&self.inline_comment], visitor);
        }
    }
}

impl ast::Field {
    /// Visits the field and its comments.
    pub fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) {
        if visitor.visit_field(self) {
            accept_comments(&self.comments, &[&self.inline_comment], visitor);
        }
    }
}

impl ast::MapField {
    /// Visits the field and its comments.
    pub fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) {
        if visitor.visit_map_field(self) {
            accept_comments(&self.comments, &[&self.inline_comment], visitor);
        }
    }
}

impl ast::OneofField {
    /// Visits the field and its comments.
    pub fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) {
        if visitor.visit_oneof_field(self) {
            accept_comments(&self.comments, &[&self.inline_comment], visitor);
        }
    }
}

impl ast::EnumField {
    /// Visits the value and its comments.
    pub fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) {
        if visitor.visit_enum_field(self) {
            accept_comments(&self.comments, &[&self.inline_comment], visitor);
        }
    }
}

impl ast::Reserved {
    /// Visits the statement and its comments.
    pub fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) {
        if visitor.visit_reserved(self) {
            accept_comments(&self.comments, &[&self.inline_comment], visitor);
        }
    }
}

impl ast::Message {
    /// Visits the message, its comments and then its body.
    pub fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) {
        if !visitor.visit_message(self) {
            return;
        }

        accept_comments(
            &self.comments,
            &[&self.inline_comment, &self.inline_comment_behind_left_curly],
            visitor,
        );
        for element in &self.body {
            match element {
                ast::BodyElement::Field(field) => field.accept(visitor),
                ast::BodyElement::Enum(enu) => enu.accept(visitor),
                ast::BodyElement::Message(message) => message.accept(visitor),
                ast::BodyElement::Option(option) => option.accept(visitor),
                ast::BodyElement::Oneof(oneof) => oneof.accept(visitor),
                ast::BodyElement::MapField(map) => map.accept(visitor),
                ast::BodyElement::Reserved(reserved) => reserved.accept(visitor),
                ast::BodyElement::Extend(extend) => extend.accept(visitor),
                ast::BodyElement::Comment(comment) => comment.accept(visitor),
            }
        }
    }
}

impl ast::Oneof {
    /// Visits the oneof, its comments and then its body.
    pub fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) {
        if !visitor.visit_oneof(self) {
            return;
        }

        accept_comments(
            &self.comments,
            &[&self.inline_comment, &self.inline_comment_behind_left_curly],
            visitor,
        );
        for element in &self.body {
            match element {
                ast::OneofElement::Field(field) => field.accept(visitor),
                ast::OneofElement::Option(option) => option.accept(visitor),
                ast::OneofElement::Comment(comment) => comment.accept(visitor),
            }
        }
    }
}

impl ast::Enum {
    /// Visits the enum, its comments and then its body.
    pub fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) {
        if !visitor.visit_enum(self) {
            return;
        }

        accept_comments(
            &self.comments,
            &[&self.inline_comment, &self.inline_comment_behind_left_curly],
            visitor,
        );
        for element in &self.body {
            match element {
                ast::EnumElement::Option(option) => option.accept(visitor),
                ast::EnumElement::Field(field) => field.accept(visitor),
                ast::EnumElement::Reserved(reserved) => reserved.accept(visitor),
                ast::EnumElement::Comment(comment) => comment.accept(visitor),
            }
        }
    }
}

impl ast::Extend {
    /// Visits the block, its comments and then its fields.
    pub fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) {
        if !visitor.visit_extend(self) {
            return;
        }

        accept_comments(
            &self.comments,
            &[&self.inline_comment, &self.inline_comment_behind_left_curly],
            visitor,
        );
        for element in &self.body {
            match element {
                ast::ExtendElement::Field(field) => field.accept(visitor),
                ast::ExtendElement::Comment(comment) => comment.accept(visitor),
            }
        }
    }
}

impl ast::Service {
    /// Visits the service, its comments and then its body.
    pub fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) {
        if !visitor.visit_service(self) {
            return;
        }

        accept_comments(
            &self.comments,
            &[&self.inline_comment, &self.inline_comment_behind_left_curly],
            visitor,
        );
        for element in &self.body {
            match element {
                ast::ServiceElement::Option(option) => option.accept(visitor),
                ast::ServiceElement::Rpc(rpc) => rpc.accept(visitor),
                ast::ServiceElement::Comment(comment) => comment.accept(visitor),
            }
        }
    }
}

impl ast::Rpc {
    /// Visits the method, its comments and then its options.
    pub fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) {
        if !visitor.visit_rpc(self) {
            return;
        }

        accept_comments(
            &self.comments,
            &[&self.inline_comment, &self.inline_comment_behind_left_curly],
            visitor,
        );
        for element in &self.body {
            match element {
                ast::RpcElement::Option(option) => option.accept(visitor),
                ast::RpcElement::Comment(comment) => comment.accept(visitor),
            }
        }
    }
}

use crate::plan::FieldPlan;
use battlegen_schema::prelude::*;

///
/// CppField
///
/// C++ spellings for one planned field.
///

pub struct CppField<'a> {
    pub plan: &'a FieldPlan,
}

impl<'a> CppField<'a> {
    pub const fn new(plan: &'a FieldPlan) -> Self {
        Self { plan }
    }

    pub fn name(&self) -> &str {
        &self.plan.name
    }

    pub const fn kind(&self) -> FieldKind {
        self.plan.kind()
    }

    pub const fn descriptor(&self) -> &TypeDescriptor {
        &self.plan.descriptor
    }

    /// Companion member holding the allocated element count of an array.
    pub fn count_member(&self) -> Option<String> {
        matches!(self.kind(), FieldKind::Array).then(|| format!("__{}_len", self.name()))
    }

    /// Element type of an array field, pointer markers included.
    pub fn element_type(&self) -> &str {
        &self.descriptor().reference_spelling
    }

    pub fn member_type(&self) -> String {
        let d = self.descriptor();

        match self.kind() {
            FieldKind::Builtin => {
                let mut ty = d.scalar_spelling();
                if d.is_array {
                    ty.push('*');
                }
                ty.push_str(&"*".repeat(d.pointer_depth));
                ty
            }
            FieldKind::Array => format!("{}*", self.element_type()),
            FieldKind::Nested | FieldKind::Pointer => d.reference_spelling.clone(),
        }
    }

    pub fn declarations(&self) -> Vec<String> {
        let name = self.name();
        let ty = self.member_type();

        let mut decls = vec![match self.kind() {
            FieldKind::Nested => format!("{ty} {name};"),
            FieldKind::Array | FieldKind::Builtin | FieldKind::Pointer => {
                format!("{ty} {name} = 0;")
            }
        }];
        if let Some(count) = self.count_member() {
            decls.push(format!("unsigned char {count} = 0;"));
        }

        decls
    }

    pub fn default_inits(&self) -> Vec<String> {
        let name = self.name();

        let mut inits = vec![match self.kind() {
            FieldKind::Nested => format!("{name}()"),
            FieldKind::Array | FieldKind::Builtin | FieldKind::Pointer => format!("{name}(0)"),
        }];
        if let Some(count) = self.count_member() {
            inits.push(format!("{count}(0)"));
        }

        inits
    }

    pub fn params(&self) -> Vec<String> {
        let mut params = vec![format!("{} {}", self.member_type(), self.name())];
        if let Some(count) = self.count_member() {
            params.push(format!("unsigned char {count}"));
        }

        params
    }

    pub fn copy_inits(&self) -> Vec<String> {
        let name = self.name();

        let mut inits = vec![format!("{name}({name})")];
        if let Some(count) = self.count_member() {
            inits.push(format!("{count}({count})"));
        }

        inits
    }
}

///
/// Pointer helpers
///
/// `depth` counts the pointers between `expr` and the value it reaches.
///

/// Allocation of a `base` value behind `depth` pointers.
pub fn alloc_expr(base: &str, depth: usize) -> String {
    match depth {
        0 => format!("{base}()"),
        1 => format!("new {base}()"),
        _ => format!(
            "new {base}{}({})",
            "*".repeat(depth - 1),
            alloc_expr(base, depth - 1)
        ),
    }
}

/// Member access prefix reaching through every pointer.
pub fn deref_access(expr: &str, depth: usize) -> String {
    match depth {
        0 => format!("{expr}."),
        1 => format!("{expr}->"),
        _ => format!("({}{expr})->", "*".repeat(depth - 1)),
    }
}

/// Delete statements releasing a chain of `depth` pointers, innermost first.
pub fn release_stmts(expr: &str, depth: usize) -> Vec<String> {
    (0..depth)
        .rev()
        .map(|k| format!("delete {}{expr};", "*".repeat(k)))
        .collect()
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    fn field(name: &str, ty: &str) -> FieldPlan {
        FieldPlan::new(name, 0, ty, BuiltinMatch::Substring)
    }

    #[test]
    fn member_types_per_kind() {
        let cases = [
            ("unsigned short", "unsigned short"),
            ("char[]", "char*"),
            ("float*", "float*"),
            ("Foo[]", "Foo*"),
            ("Foo[]*", "Foo**"),
            ("Bar**", "Bar**"),
            ("Vec2", "Vec2"),
            ("List<Foo>", "List<Foo>"),
        ];

        for (raw, expected) in cases {
            let plan = field("f", raw);
            assert_eq!(CppField::new(&plan).member_type(), expected, "type '{raw}'");
        }
    }

    #[test]
    fn arrays_declare_a_count_member() {
        let plan = field("items", "Foo[]");
        let f = CppField::new(&plan);

        assert_eq!(
            f.declarations(),
            ["Foo* items = 0;", "unsigned char __items_len = 0;"]
        );
        assert_eq!(f.params(), ["Foo* items", "unsigned char __items_len"]);
    }

    #[test]
    fn nested_values_have_no_zero_initializer() {
        let plan = field("pos", "Vec2");
        let f = CppField::new(&plan);

        assert_eq!(f.declarations(), ["Vec2 pos;"]);
        assert_eq!(f.default_inits(), ["pos()"]);
    }

    #[test]
    fn pointer_chains() {
        assert_eq!(alloc_expr("Bar", 1), "new Bar()");
        assert_eq!(alloc_expr("Bar", 2), "new Bar*(new Bar())");
        assert_eq!(deref_access("this->c", 2), "(*this->c)->");
        assert_eq!(
            release_stmts("this->c", 2),
            ["delete *this->c;", "delete this->c;"]
        );
    }
}

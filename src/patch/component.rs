//! Locate a component's body inside a parsed program.
//!
//! Lookup order:
//! 1. function declaration with the given name (plain or exported)
//! 2. variable initialized with an arrow function (parentheses ignored)
//! 3. the default export, when the name is `default` or the file stem
//!
//! Only top-level statements are considered.

use oxc::ast::ast::{
    Declaration, ExportDefaultDeclarationKind, Expression, Function, FunctionBody, Program,
    Statement, VariableDeclaration,
};

/// Which lookup rule matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentKind {
    FunctionDeclaration,
    ArrowVariable,
    DefaultExport,
}

/// A located component body.
#[derive(Clone, Copy)]
pub struct Component<'p, 'a> {
    pub kind: ComponentKind,
    pub body: &'p FunctionBody<'a>,
}

/// Find the component named `name`, honoring the lookup order above.
pub fn find_component<'p, 'a>(
    program: &'p Program<'a>,
    name: &str,
    file_stem: Option<&str>,
) -> Option<Component<'p, 'a>> {
    if let Some(body) = function_declaration(program, name) {
        return Some(Component { kind: ComponentKind::FunctionDeclaration, body });
    }
    if let Some(body) = arrow_variable(program, name) {
        return Some(Component { kind: ComponentKind::ArrowVariable, body });
    }
    if name == "default" || file_stem == Some(name) {
        return default_export(program)
            .map(|body| Component { kind: ComponentKind::DefaultExport, body });
    }
    None
}

fn function_declaration<'p, 'a>(program: &'p Program<'a>, name: &str) -> Option<&'p FunctionBody<'a>> {
    program.body.iter().find_map(|stmt| {
        let func: &'p Function<'a> = match stmt {
            Statement::FunctionDeclaration(func) => &**func,
            Statement::ExportNamedDeclaration(export) => match &export.declaration {
                Some(Declaration::FunctionDeclaration(func)) => &**func,
                _ => return None,
            },
            Statement::ExportDefaultDeclaration(export) => match &export.declaration {
                ExportDefaultDeclarationKind::FunctionDeclaration(func) => &**func,
                _ => return None,
            },
            _ => return None,
        };
        let id = func.id.as_ref()?;
        if id.name.as_str() != name {
            return None;
        }
        func.body.as_deref()
    })
}

fn variable_declarations<'p, 'a>(
    program: &'p Program<'a>,
) -> impl Iterator<Item = &'p VariableDeclaration<'a>> {
    program.body.iter().filter_map(|stmt| match stmt {
        Statement::VariableDeclaration(decl) => Some(&**decl),
        Statement::ExportNamedDeclaration(export) => match &export.declaration {
            Some(Declaration::VariableDeclaration(decl)) => Some(&**decl),
            _ => None,
        },
        _ => None,
    })
}

fn arrow_variable<'p, 'a>(program: &'p Program<'a>, name: &str) -> Option<&'p FunctionBody<'a>> {
    variable_declarations(program)
        .flat_map(|decl| decl.declarations.iter())
        .find_map(|declarator| {
            if declarator.id.get_identifier_name()?.as_str() != name {
                return None;
            }
            arrow_body(declarator.init.as_ref()?)
        })
}

fn arrow_body<'p, 'a>(expr: &'p Expression<'a>) -> Option<&'p FunctionBody<'a>> {
    match expr.without_parentheses() {
        Expression::ArrowFunctionExpression(arrow) => Some(&*arrow.body),
        _ => None,
    }
}

fn default_export<'p, 'a>(program: &'p Program<'a>) -> Option<&'p FunctionBody<'a>> {
    program.body.iter().find_map(|stmt| {
        let Statement::ExportDefaultDeclaration(export) = stmt else {
            return None;
        };
        match &export.declaration {
            ExportDefaultDeclarationKind::FunctionDeclaration(func) => func.body.as_deref(),
            ExportDefaultDeclarationKind::FunctionExpression(func) => func.body.as_deref(),
            ExportDefaultDeclarationKind::ArrowFunctionExpression(arrow) => Some(&*arrow.body),
            ExportDefaultDeclarationKind::ParenthesizedExpression(paren) => {
                match paren.expression.without_parentheses() {
                    Expression::FunctionExpression(func) => func.body.as_deref(),
                    other => arrow_body(other),
                }
            }
            // `export default Hero;` re-exports a component declared above.
            ExportDefaultDeclarationKind::Identifier(ident) => {
                let target = ident.name.as_str();
                function_declaration(program, target).or_else(|| arrow_variable(program, target))
            }
            _ => None,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patch::source::parse;
    use oxc::allocator::Allocator;
    use std::path::Path;

    fn kind_of(source: &str, name: &str, stem: Option<&str>) -> Option<ComponentKind> {
        let allocator = Allocator::default();
        let program = parse(&allocator, source, Path::new("App.tsx")).unwrap();
        find_component(&program, name, stem).map(|c| c.kind)
    }

    #[test]
    fn test_function_declaration() {
        let src = "function Hero() { return <h1>Hi</h1>; }";
        assert_eq!(kind_of(src, "Hero", None), Some(ComponentKind::FunctionDeclaration));
    }

    #[test]
    fn test_exported_function_declaration() {
        let src = "export function Hero() { return <h1>Hi</h1>; }";
        assert_eq!(kind_of(src, "Hero", None), Some(ComponentKind::FunctionDeclaration));
    }

    #[test]
    fn test_arrow_variable_with_parentheses() {
        let src = "export const Card = (() => <div>Card</div>);";
        assert_eq!(kind_of(src, "Card", None), Some(ComponentKind::ArrowVariable));
    }

    #[test]
    fn test_function_declaration_wins_over_arrow() {
        let src = "const Hero = () => <h2>B</h2>;\nfunction Hero() { return <h1>A</h1>; }";
        assert_eq!(kind_of(src, "Hero", None), Some(ComponentKind::FunctionDeclaration));
    }

    #[test]
    fn test_anonymous_default_export_by_stem() {
        let src = "export default () => <main>Home</main>;";
        assert_eq!(kind_of(src, "App", Some("App")), Some(ComponentKind::DefaultExport));
        assert_eq!(kind_of(src, "default", Some("App")), Some(ComponentKind::DefaultExport));
        assert_eq!(kind_of(src, "Other", Some("App")), None);
    }

    #[test]
    fn test_default_export_identifier() {
        let src = "const Page = () => <p>Page</p>;\nexport default Page;";
        assert_eq!(kind_of(src, "default", None), Some(ComponentKind::DefaultExport));
    }

    #[test]
    fn test_missing_component() {
        let src = "const helper = 1;\nfunction Other() { return null; }";
        assert_eq!(kind_of(src, "Hero", None), None);
        assert_eq!(kind_of(src, "helper", None), None);
    }
}

//! Literal extraction and rewriting
//!
//! Every literal in a program gets a key derived from where it sits (see [`keys`]) and its value
//! is recorded in a [`LiteralTable`]. In rewrite mode the literal is also replaced by a member
//! access into the table, so a running program reads `__AllVars.a482991` instead of `1` and can
//! be hot-patched by updating the table.
//!
//! Collection and rewriting are the same collector over the same traversal; the only difference
//! is whether it hands back a replacement node. Keys for a given tree are therefore identical in
//! both modes.
//!
//! A literal-only edit is sent as a patch built by [`patch_vars`]: new values under the keys of
//! the tree that is running.

pub mod keys;
pub mod table;

pub use keys::{derive_key, hash_context, KeyContext};
pub use table::LiteralTable;

use crate::live::ast::{
    rewrite_program, walk_program, Expression, Literal, LiteralContext, LiteralRewriter,
    LiteralVisitor, Program,
};
use crate::live::config::{Binding, RewriteConfig};
use crate::live::formats::{print_program, PrintOptions};

/// Result of rewriting a program
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    /// Extracted values, in traversal order
    pub vars: LiteralTable,
    /// The program with every extractable literal replaced by a table access
    pub program: Program,
}

impl Extraction {
    /// Printed program with the table bound according to `config.binding`
    pub fn render(&self, config: &RewriteConfig, options: &PrintOptions) -> String {
        let program = print_program(&self.program, options);
        match config.binding {
            Binding::Declaration => format!(
                "{} {} = {}; {}",
                config.declaration_keyword.as_str(),
                config.all_vars_name,
                self.vars,
                program
            ),
            Binding::Parameter => {
                format!("(function ({}) {{\n{}}})", config.all_vars_name, program)
            }
        }
    }
}

/// Extract every literal of `program` and rewrite it into a table access
pub fn extract(program: &Program, config: &RewriteConfig) -> Extraction {
    let mut program = program.clone();
    let mut collector = LiteralCollector::new(config);
    rewrite_program(&mut program, &mut collector);

    tracing::debug!(
        component = module_path!(),
        op = "extract",
        event = "end",
        literals = collector.vars.len(),
        inline = collector.inline,
    );

    Extraction {
        vars: collector.vars,
        program,
    }
}

/// Same keys and values as [`extract`], without rewriting anything
pub fn collect_vars(program: &Program, config: &RewriteConfig) -> LiteralTable {
    let collector = LiteralCollector::collect(program, config);

    tracing::debug!(
        component = module_path!(),
        op = "collect_vars",
        event = "end",
        literals = collector.vars.len(),
    );

    collector.vars
}

/// Values of `current` under the keys the program rendered from `running` reads
///
/// Keys depend on raw text and columns, so re-deriving them from an edited tree does not
/// reach the running table. Instead the literal sites of both trees are paired in traversal
/// order. The trees must be structurally equal. Returns `None` when the sites do not line up,
/// for instance when a literal became extractable or stopped being so. Such an edit needs a
/// reload.
pub fn patch_vars(current: &Program, running: &Program, config: &RewriteConfig) -> Option<LiteralTable> {
    let running = LiteralCollector::collect(running, config);
    let edited = LiteralCollector::collect(current, config);
    if running.sites.len() != edited.sites.len() {
        return None;
    }

    let mut patch = LiteralTable::new();
    for (running_key, edited_key) in running.sites.iter().zip(&edited.sites) {
        match (running_key, edited_key) {
            (Some(running_key), Some(edited_key)) => {
                let value = edited.vars.get(edited_key)?;
                patch.insert(running_key.clone(), value.clone());
            }
            (None, None) => {}
            _ => return None,
        }
    }

    tracing::debug!(
        component = module_path!(),
        op = "patch_vars",
        event = "end",
        literals = patch.len(),
    );
    Some(patch)
}

struct LiteralCollector<'a> {
    config: &'a RewriteConfig,
    vars: LiteralTable,
    /// Key of every literal site in traversal order, `None` where the literal stays inline
    sites: Vec<Option<String>>,
    /// Literals left in place because JSON cannot carry their value
    inline: usize,
}

impl<'a> LiteralCollector<'a> {
    fn new(config: &'a RewriteConfig) -> Self {
        Self {
            config,
            vars: LiteralTable::new(),
            sites: Vec::new(),
            inline: 0,
        }
    }

    fn collect(program: &Program, config: &'a RewriteConfig) -> Self {
        let mut collector = Self::new(config);
        walk_program(program, &mut collector);
        collector
    }

    /// Record `literal` and return the key it is stored under
    fn record(&mut self, literal: &Literal, context: LiteralContext<'_>) -> Option<String> {
        let Some(value) = literal.value.to_json() else {
            tracing::debug!(
                component = module_path!(),
                op = "extract",
                event = "literal_left_inline",
                raw = %literal.raw,
                location = %literal.location,
            );
            self.inline += 1;
            self.sites.push(None);
            return None;
        };

        let start = literal.location.start;
        let context = match context {
            LiteralContext::Declarator { name, line } => KeyContext::Declarator { name, line },
            LiteralContext::Argument { index } => KeyContext::Argument {
                raw: &literal.raw,
                index,
                line: start.line_number(),
            },
            LiteralContext::Other => KeyContext::Location {
                line: start.line_number(),
                column: start.column,
            },
        };

        let key = derive_key(&self.config.key_prefix, &context);
        let key = self.vars.insert_unique(key, value);
        self.sites.push(Some(key.clone()));
        Some(key)
    }
}

impl LiteralVisitor for LiteralCollector<'_> {
    fn visit_literal(&mut self, literal: &Literal, context: LiteralContext<'_>) {
        self.record(literal, context);
    }

    fn is_rewritten(&self, expression: &Expression) -> bool {
        expression.is_table_access(&self.config.all_vars_name)
    }
}

impl LiteralRewriter for LiteralCollector<'_> {
    fn rewrite_literal(&mut self, literal: &Literal, context: LiteralContext<'_>) -> Option<Expression> {
        let key = self.record(literal, context)?;
        Some(Expression::member(&self.config.all_vars_name, &key))
    }

    fn is_rewritten(&self, expression: &Expression) -> bool {
        expression.is_table_access(&self.config.all_vars_name)
    }
}

use crate::{
    Error,
    instruction::{Label, Operand},
    lookahead::{can_assign, can_branch},
    session::CompilationSession,
    variable_manager::Reservation,
};
use parser::tree_node::{IfStatement, Node, TernaryExpression, WhileStatement};

/// One `test: body` arm of an if chain
type Arm<'n> = (&'n Node, &'n Node);

impl CompilationSession {
    pub(crate) fn if_statement(&mut self, statement: &IfStatement) -> Result<(), Error> {
        let exit = self.labels.create();
        let arms = statement
            .arms
            .iter()
            .map(|arm| (&arm.test, &arm.body))
            .collect::<Vec<Arm>>();

        self.conditional_chain(&arms, statement.else_body.as_deref(), Some(exit), None)?;
        self.insert_label(Some(exit));
        Ok(())
    }

    /// `value if test else otherwise`, lowered as an if chain whose arms write
    /// into one destination.
    pub(crate) fn ternary(
        &mut self,
        ternary: &TernaryExpression,
        destination: Option<Operand>,
    ) -> Result<Operand, Error> {
        let mut scope = self.reserve(Reservation::into_or_fresh(destination))?;
        let destination = scope
            .destination()
            .ok_or_else(|| Error::Code("conditional expression without a destination".into()))?;

        let arms = [(&*ternary.test, &*ternary.value)];
        scope.conditional_chain(&arms, Some(&*ternary.otherwise), None, Some(&destination))?;

        Ok(destination)
    }

    /// Emits the first arm and recurses on the rest. Statement chains share
    /// `exit`, expression chains (`target` set) mint an exit label per level.
    fn conditional_chain(
        &mut self,
        arms: &[Arm],
        otherwise: Option<&Node>,
        exit: Option<Label>,
        target: Option<&Operand>,
    ) -> Result<(), Error> {
        let Some(((test, body), rest)) = arms.split_first() else {
            if let Some(otherwise) = otherwise {
                match target {
                    Some(destination) => {
                        let value = {
                            let mut scope = self.reserve(Reservation::Fresh)?;
                            scope.operand(otherwise, None)?
                        };
                        self.push_copy(value, destination.clone());
                    }
                    None => self.statement(otherwise)?,
                }
            }
            return Ok(());
        };

        let skip = can_branch(test).then(|| self.labels.create());
        let condition = {
            let mut scope = self.reserve(Reservation::Fresh)?;
            let t0 = scope.destination();
            scope.condition(test, t0, skip)?
        };
        let skip = match skip {
            Some(label) => label,
            None => self.push_jump_unless(condition, None),
        };

        match target {
            Some(destination) => {
                let lands_in_place = can_assign(&self.symbols, body);
                let value = {
                    let mut scope = self.reserve(Reservation::Into(destination.clone()))?;
                    scope.operand(body, Some(destination.clone()))?
                };
                if !lands_in_place {
                    self.push_copy(value, destination.clone());
                }
            }
            None => self.statement(body)?,
        }

        let has_more = !rest.is_empty() || otherwise.is_some();
        let jump = has_more.then(|| self.push_jump(exit));

        self.insert_label(Some(skip));

        if let Some(jump) = jump {
            self.conditional_chain(rest, otherwise, exit, target)?;
            self.insert_label(Some(jump));
        }

        Ok(())
    }

    pub(crate) fn while_statement(&mut self, statement: &WhileStatement) -> Result<(), Error> {
        let entry = self.insert_label(None);

        let exit = can_branch(&statement.test).then(|| self.labels.create());
        let condition = {
            let mut scope = self.reserve(Reservation::Fresh)?;
            let s0 = scope.destination();
            scope.condition(&statement.test, s0, exit)?
        };
        let exit = match exit {
            Some(label) => label,
            None => self.push_jump_unless(condition, None),
        };

        self.statement(&statement.body)?;
        self.push_jump(Some(entry));
        self.insert_label(Some(exit));

        Ok(())
    }
}

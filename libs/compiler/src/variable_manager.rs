// Registers are handed out as a stack. Variables claim the register under the
// cursor for the rest of the compile, temporaries are released in reverse order.

use crate::{
    instruction::{Operand, REGISTER_COUNT, Register},
    session::CompilationSession,
};
use quick_error::quick_error;
use std::ops::{Deref, DerefMut};
use tracing::trace;

quick_error! {
    #[derive(Debug)]
    pub enum Error {
        OutOfRegisters(index: usize) {
            display("register r{} is out of range, only {} registers are available", index, REGISTER_COUNT)
        }
    }
}

#[derive(Debug, Default)]
pub struct RegisterAllocator {
    cursor: usize,
}

impl RegisterAllocator {
    /// The register under the cursor, i.e. the one most recently released.
    pub fn current(&self) -> Result<Register, Error> {
        Register::new(self.cursor).ok_or(Error::OutOfRegisters(self.cursor))
    }

    pub fn reserve(&mut self) -> Result<Register, Error> {
        let register = self.current()?;
        self.cursor += 1;
        trace!("reserved {}", register);
        Ok(register)
    }

    pub fn release(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
        trace!("released r{}", self.cursor);
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }
}

/// How a [`RegisterScope`] gets its destination.
#[derive(Debug, Clone)]
pub enum Reservation {
    /// The caller already knows where the value goes
    Into(Operand),
    /// The operand is a literal or location and needs no register
    Constant,
    /// Take the next free register for the lifetime of the scope
    Fresh,
}

impl Reservation {
    pub fn into_or_fresh(destination: Option<Operand>) -> Self {
        match destination {
            Some(destination) => Self::Into(destination),
            None => Self::Fresh,
        }
    }

    pub fn constant_or_fresh(is_constant: bool) -> Self {
        if is_constant { Self::Constant } else { Self::Fresh }
    }
}

/// Borrows the session for as long as a temporary register is needed and hands
/// the register back when dropped, on every exit path.
pub struct RegisterScope<'s> {
    session: &'s mut CompilationSession,
    destination: Option<Operand>,
    reserved: bool,
}

impl<'s> RegisterScope<'s> {
    pub(crate) fn new(
        session: &'s mut CompilationSession,
        reservation: Reservation,
    ) -> Result<Self, Error> {
        let (destination, reserved) = match reservation {
            Reservation::Into(destination) => (Some(destination), false),
            Reservation::Constant => (None, false),
            Reservation::Fresh => (Some(session.registers.reserve()?.into()), true),
        };

        Ok(Self {
            session,
            destination,
            reserved,
        })
    }

    /// `None` only for [`Reservation::Constant`]
    pub fn destination(&self) -> Option<Operand> {
        self.destination.clone()
    }
}

impl Deref for RegisterScope<'_> {
    type Target = CompilationSession;

    fn deref(&self) -> &Self::Target {
        self.session
    }
}

impl DerefMut for RegisterScope<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.session
    }
}

impl Drop for RegisterScope<'_> {
    fn drop(&mut self) {
        if self.reserved {
            self.session.registers.release();
        }
    }
}

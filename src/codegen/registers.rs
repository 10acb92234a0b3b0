// src/codegen/registers.rs
//
// Free-list allocator over the scratch registers r4-r10. There is no
// spilling: running out is a fatal error for the compilation.

use crate::codegen::location::Reg;
use crate::errors::CodegenError;

const FIRST_SCRATCH: u8 = 4;
const SCRATCH_COUNT: usize = 7;

#[derive(Debug, Clone)]
pub struct RegisterPool {
    free: [bool; SCRATCH_COUNT],
}

impl Default for RegisterPool {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterPool {
    pub fn new() -> Self {
        Self {
            free: [true; SCRATCH_COUNT],
        }
    }

    /// Lowest free scratch register
    pub fn acquire(&mut self, line: u32) -> Result<Reg, CodegenError> {
        let slot = self
            .free
            .iter()
            .position(|&free| free)
            .ok_or(CodegenError::OutOfRegisters { line })?;
        self.free[slot] = false;
        Ok(Reg(FIRST_SCRATCH + slot as u8))
    }

    /// Return a register to the pool. Releasing a free register, or one
    /// outside the pool, is a generator bug; it is logged and ignored.
    pub fn release(&mut self, reg: Reg) {
        let Some(slot) = Self::slot(reg) else {
            tracing::error!(%reg, "released a register outside the scratch pool");
            return;
        };
        if self.free[slot] {
            tracing::error!(%reg, "register released twice");
            return;
        }
        self.free[slot] = true;
    }

    pub fn is_free(&self, reg: Reg) -> bool {
        Self::slot(reg).is_some_and(|slot| self.free[slot])
    }

    pub fn in_use(&self) -> usize {
        self.free.iter().filter(|&&free| !free).count()
    }

    fn slot(reg: Reg) -> Option<usize> {
        let slot = reg.0.checked_sub(FIRST_SCRATCH)? as usize;
        (slot < SCRATCH_COUNT).then_some(slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquires_lowest_free() {
        let mut pool = RegisterPool::new();
        let a = pool.acquire(1).unwrap();
        let b = pool.acquire(1).unwrap();
        assert_eq!((a, b), (Reg(4), Reg(5)));
        pool.release(a);
        assert_eq!(pool.acquire(1).unwrap(), Reg(4));
        assert_eq!(pool.in_use(), 2);
    }

    #[test]
    fn exhaustion_reports_line() {
        let mut pool = RegisterPool::new();
        for _ in 0..7 {
            pool.acquire(3).unwrap();
        }
        assert_eq!(
            pool.acquire(12),
            Err(CodegenError::OutOfRegisters { line: 12 })
        );
    }

    #[test]
    fn double_release_is_ignored() {
        let mut pool = RegisterPool::new();
        let r = pool.acquire(1).unwrap();
        pool.release(r);
        pool.release(r);
        pool.release(Reg::FP);
        assert!(pool.is_free(r));
        assert_eq!(pool.in_use(), 0);
        assert_eq!(pool.acquire(1).unwrap(), Reg(4));
        assert_eq!(pool.acquire(1).unwrap(), Reg(5));
    }
}

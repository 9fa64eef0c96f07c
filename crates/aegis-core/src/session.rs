//! Per-session handle tables.
//!
//! Each calling session owns its objects and operation states; handles
//! are opaque nonzero integers scoped to the session that created them.
//! Teardown releases every state first (dropping busy leases) and then
//! every object.

use std::collections::HashMap;

use tracing::debug;

use crate::error::{TeeError, TeeResult};
use crate::object::CrypObj;
use crate::state::OpState;

/// Handle to a session's object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjHandle(pub u64);

/// Handle to a session's operation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StateHandle(pub u64);

/// One calling session's crypto resources.
#[derive(Debug, Default)]
pub struct Session {
    objects: HashMap<u64, CrypObj>,
    states: HashMap<u64, OpState>,
    next_handle: u64,
}

impl Session {
    /// An empty session.
    pub fn new() -> Self {
        Self::default()
    }

    fn next(&mut self) -> u64 {
        // Handle 0 stays invalid so callers can use it as "no key".
        self.next_handle += 1;
        self.next_handle
    }

    /// Installs an object, returning its handle.
    pub fn add_obj(&mut self, obj: CrypObj) -> ObjHandle {
        let h = self.next();
        self.objects.insert(h, obj);
        ObjHandle(h)
    }

    /// Looks up an object.
    pub fn obj(&self, h: ObjHandle) -> TeeResult<&CrypObj> {
        self.objects.get(&h.0).ok_or(TeeError::ItemNotFound)
    }

    /// Looks up an object mutably.
    pub fn obj_mut(&mut self, h: ObjHandle) -> TeeResult<&mut CrypObj> {
        self.objects.get_mut(&h.0).ok_or(TeeError::ItemNotFound)
    }

    /// Removes an object from the table.
    pub fn remove_obj(&mut self, h: ObjHandle) -> TeeResult<CrypObj> {
        self.objects.remove(&h.0).ok_or(TeeError::ItemNotFound)
    }

    /// Distinct mutable borrows of two objects.
    pub fn obj_pair_mut(
        &mut self,
        a: ObjHandle,
        b: ObjHandle,
    ) -> TeeResult<(&mut CrypObj, &mut CrypObj)> {
        if a == b {
            return Err(TeeError::BadParameters);
        }
        let [fst, snd] = self.objects.get_disjoint_mut([&a.0, &b.0]);
        match (fst, snd) {
            (Some(x), Some(y)) => Ok((x, y)),
            _ => Err(TeeError::ItemNotFound),
        }
    }

    /// Installs an operation state, returning its handle.
    pub fn add_state(&mut self, state: OpState) -> StateHandle {
        let h = self.next();
        self.states.insert(h, state);
        StateHandle(h)
    }

    /// Looks up a state.
    pub fn state(&self, h: StateHandle) -> TeeResult<&OpState> {
        self.states.get(&h.0).ok_or(TeeError::ItemNotFound)
    }

    /// Looks up a state mutably.
    pub fn state_mut(&mut self, h: StateHandle) -> TeeResult<&mut OpState> {
        self.states.get_mut(&h.0).ok_or(TeeError::ItemNotFound)
    }

    /// Distinct mutable borrows of two states.
    pub fn state_pair_mut(
        &mut self,
        a: StateHandle,
        b: StateHandle,
    ) -> TeeResult<(&mut OpState, &mut OpState)> {
        if a == b {
            return Err(TeeError::BadParameters);
        }
        let [fst, snd] = self.states.get_disjoint_mut([&a.0, &b.0]);
        match (fst, snd) {
            (Some(x), Some(y)) => Ok((x, y)),
            _ => Err(TeeError::ItemNotFound),
        }
    }

    /// Mutable state together with an immutable key object.
    pub fn state_and_obj(
        &mut self,
        sh: StateHandle,
        oh: ObjHandle,
    ) -> TeeResult<(&mut OpState, &CrypObj)> {
        let st = self.states.get_mut(&sh.0).ok_or(TeeError::ItemNotFound)?;
        let ob = self.objects.get(&oh.0).ok_or(TeeError::ItemNotFound)?;
        Ok((st, ob))
    }

    /// Frees one state: runs any pending stream teardown and releases the
    /// busy leases on its key objects.
    pub fn free_state(&mut self, h: StateHandle) -> TeeResult<()> {
        let mut st = self.states.remove(&h.0).ok_or(TeeError::ItemNotFound)?;
        if st.finalize_pending {
            st.ctx.finalize();
        }
        for key in [st.key1, st.key2].into_iter().flatten() {
            if let Some(o) = self.objects.get_mut(&key.0) {
                o.busy = false;
            }
        }
        debug!(state = h.0, "freed operation state");
        Ok(())
    }

    /// Tears the session down: all states first, then all objects.
    pub fn close(&mut self) {
        let handles: Vec<u64> = self.states.keys().copied().collect();
        for h in handles {
            let _ = self.free_state(StateHandle(h));
        }
        for (_, mut obj) in self.objects.drain() {
            obj.attr_free();
        }
        debug!("session closed");
    }

    /// Number of live objects; used by teardown assertions in tests.
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Number of live states.
    pub fn state_count(&self) -> usize {
        self.states.len()
    }
}

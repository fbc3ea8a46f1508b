//! In-process graph service for headless hosts and tests.
//!
//! [`OfflineGraph`] records attached stages and connections and validates
//! endpoints, but renders no audio. Instantiation is deferred until the host
//! calls [`OfflineGraph::complete_pending`], which mirrors the asynchronous
//! attachment of real units. Instantiated units are [`SoftUnit`]s: plain
//! parameter stores whose read-only metrics the host writes directly.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::config::StreamFormat;
use crate::crossfade::CrossfadeStage;
use crate::graph::{Endpoint, GraphService, InstantiateCallback, NodeKey, Stage};
use crate::parameter::{ParameterId, ParameterScope};
use crate::unit::{BackingUnit, ComponentDescriptor, UnitHandle};
use crate::{Error, Result};

/// Software backing unit: stores whatever it is told.
pub struct SoftUnit {
    key: NodeKey,
    descriptor: ComponentDescriptor,
    params: Mutex<HashMap<(ParameterId, ParameterScope), f32>>,
    history: Mutex<Vec<(ParameterId, f32)>>,
    enabled: AtomicBool,
    rejecting: Mutex<Option<String>>,
}

impl SoftUnit {
    pub fn new(descriptor: ComponentDescriptor) -> Self {
        Self {
            key: NodeKey::next(),
            descriptor,
            params: Mutex::new(HashMap::new()),
            history: Mutex::new(Vec::new()),
            enabled: AtomicBool::new(true),
            rejecting: Mutex::new(None),
        }
    }

    /// Current global-scope value, if ever written.
    pub fn parameter(&self, id: ParameterId) -> Option<f32> {
        self.scoped_parameter(id, ParameterScope::Global)
    }

    pub fn scoped_parameter(&self, id: ParameterId, scope: ParameterScope) -> Option<f32> {
        self.params.lock().get(&(id, scope)).copied()
    }

    /// Write a value as the unit's own processing would (e.g. a metric).
    /// Not recorded in [`history`](Self::history).
    pub fn write_parameter(&self, id: ParameterId, value: f32) {
        self.params
            .lock()
            .insert((id, ParameterScope::Global), value);
    }

    /// Every `set_parameter` call received, in order.
    pub fn history(&self) -> Vec<(ParameterId, f32)> {
        self.history.lock().clone()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /// Make every later write fail with [`Error::Unit`], as a busy or
    /// crashed unit would. `None` accepts writes again.
    pub fn reject_writes(&self, reason: Option<&str>) {
        *self.rejecting.lock() = reason.map(str::to_string);
    }

    fn check_writable(&self) -> Result<()> {
        match &*self.rejecting.lock() {
            Some(reason) => Err(Error::Unit(reason.clone())),
            None => Ok(()),
        }
    }
}

impl BackingUnit for SoftUnit {
    fn key(&self) -> NodeKey {
        self.key
    }

    fn descriptor(&self) -> ComponentDescriptor {
        self.descriptor
    }

    fn set_parameter(&self, id: ParameterId, scope: ParameterScope, value: f32) -> Result<()> {
        self.check_writable()?;
        self.params.lock().insert((id, scope), value);
        self.history.lock().push((id, value));
        Ok(())
    }

    fn get_parameter(&self, id: ParameterId, scope: ParameterScope) -> Result<f32> {
        self.scoped_parameter(id, scope)
            .ok_or(Error::UnknownParameter(id))
    }

    fn set_enabled(&self, enabled: bool) -> Result<()> {
        self.check_writable()?;
        self.enabled.store(enabled, Ordering::Release);
        Ok(())
    }
}

impl core::fmt::Debug for SoftUnit {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SoftUnit")
            .field("key", &self.key)
            .field("descriptor", &self.descriptor)
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

/// A recorded connection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Connection {
    pub from: Endpoint,
    pub to: Endpoint,
    pub format: StreamFormat,
}

enum Entry {
    Stage(Stage),
    Unit(Arc<SoftUnit>),
}

#[derive(Default)]
struct OfflineState {
    entries: HashMap<NodeKey, Entry>,
    connections: Vec<Connection>,
    pending: Vec<(ComponentDescriptor, InstantiateCallback)>,
}

/// Graph service that keeps topology in memory.
#[derive(Default)]
pub struct OfflineGraph {
    state: Mutex<OfflineState>,
    immediate: bool,
}

impl OfflineGraph {
    /// Instantiation completes only when [`complete_pending`](Self::complete_pending) is called.
    pub fn new() -> Self {
        Self::default()
    }

    /// Instantiation completes synchronously inside `instantiate`.
    pub fn immediate() -> Self {
        Self {
            immediate: true,
            ..Self::default()
        }
    }

    pub fn pending_instantiations(&self) -> usize {
        self.state.lock().pending.len()
    }

    /// Create a [`SoftUnit`] for every pending request and fire the callbacks.
    ///
    /// Callbacks run on the calling thread with no internal lock held.
    pub fn complete_pending(&self) -> Vec<Arc<SoftUnit>> {
        let pending = std::mem::take(&mut self.state.lock().pending);

        pending
            .into_iter()
            .map(|(descriptor, on_ready)| self.complete(descriptor, on_ready))
            .collect()
    }

    /// Fail every pending request with `reason`. Returns how many failed.
    pub fn fail_pending(&self, reason: &str) -> usize {
        let pending = std::mem::take(&mut self.state.lock().pending);
        let count = pending.len();

        for (descriptor, on_ready) in pending {
            tracing::debug!("Failing instantiation of {}: {}", descriptor, reason);
            on_ready(Err(Error::Instantiation(reason.to_string())));
        }

        count
    }

    pub fn is_attached(&self, key: NodeKey) -> bool {
        self.state.lock().entries.contains_key(&key)
    }

    pub fn stage_count(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn unit(&self, key: NodeKey) -> Option<Arc<SoftUnit>> {
        match self.state.lock().entries.get(&key) {
            Some(Entry::Unit(unit)) => Some(Arc::clone(unit)),
            _ => None,
        }
    }

    /// Units instantiated for `descriptor`, in no particular order.
    pub fn units_of(&self, descriptor: ComponentDescriptor) -> Vec<Arc<SoftUnit>> {
        self.state
            .lock()
            .entries
            .values()
            .filter_map(|entry| match entry {
                Entry::Unit(unit) if unit.descriptor() == descriptor => Some(Arc::clone(unit)),
                _ => None,
            })
            .collect()
    }

    pub fn crossfade(&self, key: NodeKey) -> Option<CrossfadeStage> {
        match self.state.lock().entries.get(&key) {
            Some(Entry::Stage(Stage::Crossfade(stage))) => Some(stage.clone()),
            _ => None,
        }
    }

    pub fn connections(&self) -> Vec<Connection> {
        self.state.lock().connections.clone()
    }

    pub fn is_connected(&self, from: Endpoint, to: Endpoint) -> bool {
        self.state
            .lock()
            .connections
            .iter()
            .any(|c| c.from == from && c.to == to)
    }

    fn complete(&self, descriptor: ComponentDescriptor, on_ready: InstantiateCallback) -> Arc<SoftUnit> {
        let unit = Arc::new(SoftUnit::new(descriptor));
        self.state
            .lock()
            .entries
            .insert(unit.key(), Entry::Unit(Arc::clone(&unit)));

        tracing::debug!("Instantiated {} as {}", descriptor, unit.key());
        on_ready(Ok(Arc::clone(&unit) as UnitHandle));
        unit
    }
}

impl GraphService for OfflineGraph {
    fn attach(&self, key: NodeKey, stage: Stage) -> Result<()> {
        let mut state = self.state.lock();
        if state.entries.contains_key(&key) {
            return Err(Error::Graph(format!("{} is already attached", key)));
        }
        state.entries.insert(key, Entry::Stage(stage));
        Ok(())
    }

    fn detach(&self, key: NodeKey) -> Result<()> {
        let mut state = self.state.lock();
        if state.entries.remove(&key).is_none() {
            return Err(Error::Graph(format!("{} is not attached", key)));
        }
        state
            .connections
            .retain(|c| c.from.node != key && c.to.node != key);
        Ok(())
    }

    fn connect(&self, from: Endpoint, to: Endpoint, format: StreamFormat) -> Result<()> {
        format.validate()?;

        let mut state = self.state.lock();
        for endpoint in [from, to] {
            if !state.entries.contains_key(&endpoint.node) {
                return Err(Error::Graph(format!("{} is not attached", endpoint)));
            }
        }
        if state.connections.iter().any(|c| c.from == from && c.to == to) {
            return Ok(());
        }
        state.connections.push(Connection { from, to, format });
        Ok(())
    }

    fn disconnect(&self, from: Endpoint, to: Endpoint) -> Result<()> {
        let mut state = self.state.lock();
        let before = state.connections.len();
        state.connections.retain(|c| !(c.from == from && c.to == to));
        if state.connections.len() == before {
            return Err(Error::Graph(format!("{} -> {} is not connected", from, to)));
        }
        Ok(())
    }

    fn instantiate(&self, descriptor: ComponentDescriptor, on_ready: InstantiateCallback) {
        if self.immediate {
            self.complete(descriptor, on_ready);
        } else {
            self.state.lock().pending.push((descriptor, on_ready));
        }
    }
}

//! Serial chains of nodes.
//!
//! ```
//! use std::sync::Arc;
//! use stagebox::prelude::*;
//!
//! let graph: Arc<dyn GraphService> = Arc::new(OfflineGraph::immediate());
//! let comp = Compressor::new(CompressorConfig::default())?;
//! let delay = Delay::new(DelayConfig::default())?;
//!
//! let chain = Chain::builder(graph, StreamFormat::stereo(48000.0))
//!     .node(comp.clone())
//!     .node(delay)
//!     .build()?;
//!
//! assert_eq!(chain.len(), 2);
//! assert!(comp.is_attached());
//! chain.teardown()?;
//! # Ok::<(), stagebox::Error>(())
//! ```

use std::sync::Arc;

use stagebox_core::{AudioNode, Endpoint, GraphService, StreamFormat};

use crate::{Error, Result};

/// Collects nodes, then installs and wires them in order.
pub struct ChainBuilder {
    graph: Arc<dyn GraphService>,
    format: StreamFormat,
    nodes: Vec<Arc<dyn AudioNode>>,
}

impl ChainBuilder {
    /// Append a node. Node handles are cheap clones; keep one to control it.
    pub fn node<N: AudioNode + 'static>(mut self, node: N) -> Self {
        self.nodes.push(Arc::new(node));
        self
    }

    /// Install every node and connect each output to the next input.
    ///
    /// On failure, nodes installed so far are uninstalled again.
    pub fn build(self) -> Result<Chain> {
        if self.nodes.is_empty() {
            return Err(Error::EmptyChain);
        }
        self.format.validate()?;

        let mut chain = Chain {
            graph: self.graph,
            nodes: Vec::with_capacity(self.nodes.len()),
        };

        for node in self.nodes {
            if let Err(e) = chain.append(node, self.format) {
                tracing::warn!("Chain build failed, rolling back: {}", e);
                if let Err(rollback) = chain.uninstall_all() {
                    tracing::warn!("Rollback incomplete: {}", rollback);
                }
                return Err(e);
            }
        }

        tracing::debug!(
            "Built chain: {}",
            chain
                .nodes
                .iter()
                .map(|node| node.name())
                .collect::<Vec<_>>()
                .join(" -> ")
        );
        Ok(chain)
    }
}

/// Installed nodes connected in series.
pub struct Chain {
    graph: Arc<dyn GraphService>,
    nodes: Vec<Arc<dyn AudioNode>>,
}

impl Chain {
    pub fn builder(graph: Arc<dyn GraphService>, format: StreamFormat) -> ChainBuilder {
        ChainBuilder {
            graph,
            format,
            nodes: Vec::new(),
        }
    }

    /// Input endpoint of the first node.
    pub fn input(&self) -> Endpoint {
        self.nodes[0].endpoints().input
    }

    /// Output endpoint of the last node.
    pub fn output(&self) -> Endpoint {
        self.nodes[self.nodes.len() - 1].endpoints().output
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always `false` for a built chain.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[Arc<dyn AudioNode>] {
        &self.nodes
    }

    /// Uninstall every node, last first.
    pub fn teardown(mut self) -> Result<()> {
        self.uninstall_all()
    }

    fn append(&mut self, node: Arc<dyn AudioNode>, format: StreamFormat) -> Result<()> {
        node.install(&self.graph, format)?;

        if let Some(prev) = self.nodes.last() {
            let link = (prev.endpoints().output, node.endpoints().input);
            if let Err(e) = self.graph.connect(link.0, link.1, format) {
                if let Err(e) = node.uninstall(self.graph.as_ref()) {
                    tracing::warn!("Failed to uninstall {}: {}", node.name(), e);
                }
                return Err(e.into());
            }
        }

        self.nodes.push(node);
        Ok(())
    }

    /// Keeps going past failures; returns the first one.
    fn uninstall_all(&mut self) -> Result<()> {
        let mut first_error = None;
        while let Some(node) = self.nodes.pop() {
            if let Err(e) = node.uninstall(self.graph.as_ref()) {
                tracing::warn!("Failed to uninstall {}: {}", node.name(), e);
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }
}

impl core::fmt::Debug for Chain {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Chain")
            .field(
                "nodes",
                &self.nodes.iter().map(|node| node.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

//! Host-owned render containers
//!
//! A container is the element the host hands to a fragment's `mount`. The
//! fragment fills it with nodes; the host clears it when the region is
//! retired. Clearing runs the hooks fragments registered with
//! [`Container::on_clear`], which is where they drop their subscriptions.

use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::task::JoinHandle;

use crate::error::{self, Result};

type Action = Arc<dyn Fn() + Send + Sync>;
type ClearHook = Box<dyn FnOnce() + Send>;

/// One rendered line, optionally clickable
#[derive(Clone)]
pub struct Node {
    pub key: String,
    pub text: String,
    action: Option<Action>,
}

impl Node {
    pub fn text(key: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            text: text.into(),
            action: None,
        }
    }

    pub fn button(
        key: impl Into<String>,
        label: impl Into<String>,
        action: impl Fn() + Send + Sync + 'static,
    ) -> Self {
        Self {
            key: key.into(),
            text: label.into(),
            action: Some(Arc::new(action)),
        }
    }

    pub fn is_button(&self) -> bool {
        self.action.is_some()
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_button() {
            write!(f, "[{}]", self.text)
        } else {
            f.write_str(&self.text)
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("key", &self.key)
            .field("text", &self.text)
            .field("button", &self.is_button())
            .finish()
    }
}

#[derive(Default)]
struct Content {
    nodes: Vec<Node>,
    generation: u64,
    on_clear: Vec<ClearHook>,
    startup: Vec<JoinHandle<()>>,
}

/// Render target of one region; clones refer to the same container
#[derive(Clone)]
pub struct Container {
    id: Arc<str>,
    content: Arc<Mutex<Content>>,
}

impl Container {
    pub fn new(id: impl AsRef<str>) -> Self {
        Self {
            id: Arc::from(id.as_ref()),
            content: Arc::new(Mutex::new(Content::default())),
        }
    }

    fn content(&self) -> MutexGuard<'_, Content> {
        self.content
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn append(&self, node: Node) {
        self.content().nodes.push(node);
    }

    /// Replace all nodes
    pub fn replace(&self, nodes: Vec<Node>) {
        self.content().nodes = nodes;
    }

    /// Incremented by every [`clear`](Container::clear)
    pub fn generation(&self) -> u64 {
        self.content().generation
    }

    /// Replace all nodes unless the container was cleared since `generation`
    ///
    /// Lets asynchronous fragment startup finish rendering without writing
    /// into a container the host has already taken back.
    pub fn replace_if(&self, generation: u64, nodes: Vec<Node>) -> bool {
        let mut content = self.content();
        if content.generation != generation {
            return false;
        }
        content.nodes = nodes;
        true
    }

    pub fn nodes(&self) -> Vec<Node> {
        self.content().nodes.clone()
    }

    pub fn is_empty(&self) -> bool {
        self.content().nodes.is_empty()
    }

    /// Text of every node, one per line
    pub fn render(&self) -> String {
        self.content()
            .nodes
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Run `hook` the next time the container is cleared
    pub fn on_clear(&self, hook: impl FnOnce() + Send + 'static) {
        self.content().on_clear.push(Box::new(hook));
    }

    /// Run a fragment's asynchronous startup on the current runtime
    ///
    /// The task is tracked until [`settle`](Container::settle) or
    /// [`clear`](Container::clear); clearing detaches it without aborting.
    pub fn spawn_startup<F>(&self, startup: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let runtime = tokio::runtime::Handle::try_current().map_err(|e| {
            error::mount_failed(self.id(), format!("no async runtime for startup: {e}"))
        })?;
        let handle = runtime.spawn(startup);
        self.content().startup.push(handle);
        Ok(())
    }

    /// Wait for every tracked startup task to finish
    pub async fn settle(&self) {
        loop {
            let pending = std::mem::take(&mut self.content().startup);
            if pending.is_empty() {
                return;
            }
            for handle in pending {
                if let Err(e) = handle.await {
                    tracing::warn!(container = %self.id, error = %e, "fragment startup task failed");
                }
            }
        }
    }

    /// Remove all content and run the registered clear hooks
    pub fn clear(&self) {
        let hooks = {
            let mut content = self.content();
            content.nodes.clear();
            content.generation += 1;
            content.startup.clear();
            std::mem::take(&mut content.on_clear)
        };
        for hook in hooks {
            hook();
        }
    }

    /// Invoke the action of the button with `key`
    ///
    /// Returns false when no such button is rendered.
    pub fn click(&self, key: &str) -> bool {
        let action = self
            .content()
            .nodes
            .iter()
            .find(|node| node.key == key)
            .and_then(|node| node.action.clone());
        match action {
            Some(action) => {
                action();
                true
            }
            None => false,
        }
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let content = self.content();
        f.debug_struct("Container")
            .field("id", &self.id)
            .field("nodes", &content.nodes)
            .field("generation", &content.generation)
            .finish()
    }
}

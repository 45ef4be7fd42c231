// Shared test helpers: an in-memory container runtime and fake namespaces that
// swap the contents of a netstat file when entered, like the kernel does for
// /proc/thread-self/net.

#![allow(dead_code)]

use netns_exporter::collector::Collector;
use netns_exporter::docker_repo::ContainerRuntime;
use netns_exporter::models::RunningContainer;
use netns_exporter::netns::{NamespaceError, NamespaceOps};
use nix::errno::Errno;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::ThreadId;
use tempfile::TempDir;

pub const HOST_NS: &str = "ns:host";

pub fn netstat_text(received: u64, sent: u64) -> String {
    format!(
        "TcpExt: SyncookiesSent SyncookiesRecv\n\
         TcpExt: 0 0\n\
         IpExt: InNoRoutes InTruncatedPkts InOctets OutOctets\n\
         IpExt: 0 0 {received} {sent}\n"
    )
}

pub fn ns_path(id: &str) -> PathBuf {
    PathBuf::from(format!("ns:{id}"))
}

#[derive(Default)]
pub struct FakeRuntime {
    pub containers: Vec<RunningContainer>,
    /// Containers without an entry here behave as if they exited after listing.
    pub namespaces: HashMap<String, PathBuf>,
    pub list_fails: bool,
}

impl ContainerRuntime for FakeRuntime {
    async fn list_running(&self) -> anyhow::Result<Vec<RunningContainer>> {
        if self.list_fails {
            anyhow::bail!("docker daemon unreachable");
        }
        Ok(self.containers.clone())
    }

    async fn namespace_path(&self, id: &str) -> anyhow::Result<PathBuf> {
        self.namespaces
            .get(id)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("container {id} has no running process"))
    }
}

#[derive(Debug)]
pub struct FakeHandle {
    pub name: String,
    open: Arc<AtomicUsize>,
}

impl Drop for FakeHandle {
    fn drop(&mut self) {
        self.open.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Like setns(), entering only moves the calling thread. Threads that never
/// entered anything are in the host namespace.
pub struct FakeNamespaces {
    netstat_path: PathBuf,
    threads: Mutex<HashMap<ThreadId, String>>,
    last_thread: Mutex<Option<ThreadId>>,
    /// Known namespaces and the netstat contents visible inside (None: no file).
    stats: HashMap<String, Option<String>>,
    /// Namespaces that can be opened but not entered.
    pub broken: HashSet<String>,
    /// Namespaces whose entry switches the thread and then panics.
    pub panicking: HashSet<String>,
    open_handles: Arc<AtomicUsize>,
    pub entered: Mutex<Vec<String>>,
}

impl FakeNamespaces {
    pub fn new(netstat_path: &Path) -> Self {
        let mut stats = HashMap::new();
        stats.insert(HOST_NS.to_string(), Some(netstat_text(1, 1)));
        let ns = Self {
            netstat_path: netstat_path.to_path_buf(),
            threads: Mutex::new(HashMap::new()),
            last_thread: Mutex::new(None),
            stats,
            broken: HashSet::new(),
            panicking: HashSet::new(),
            open_handles: Arc::new(AtomicUsize::new(0)),
            entered: Mutex::new(Vec::new()),
        };
        ns.show(HOST_NS);
        ns
    }

    /// Namespace of the last thread that captured or entered one, i.e. the
    /// collector thread of the most recent cycle.
    pub fn current_name(&self) -> String {
        let last = *self.last_thread.lock().unwrap();
        match last {
            Some(thread) => self.namespace_of(thread),
            None => HOST_NS.to_string(),
        }
    }

    fn namespace_of(&self, thread: ThreadId) -> String {
        self.threads
            .lock()
            .unwrap()
            .get(&thread)
            .cloned()
            .unwrap_or_else(|| HOST_NS.to_string())
    }

    fn touch(&self) -> ThreadId {
        let thread = std::thread::current().id();
        *self.last_thread.lock().unwrap() = Some(thread);
        thread
    }

    pub fn open_handles(&self) -> usize {
        self.open_handles.load(Ordering::SeqCst)
    }

    fn show(&self, name: &str) {
        match self.stats.get(name).and_then(|s| s.as_deref()) {
            Some(text) => std::fs::write(&self.netstat_path, text).unwrap(),
            None => {
                let _ = std::fs::remove_file(&self.netstat_path);
            }
        }
    }

    fn handle(&self, name: String) -> FakeHandle {
        self.open_handles.fetch_add(1, Ordering::SeqCst);
        FakeHandle {
            name,
            open: self.open_handles.clone(),
        }
    }
}

impl NamespaceOps for FakeNamespaces {
    type Handle = FakeHandle;

    fn current(&self) -> Result<FakeHandle, NamespaceError> {
        let thread = self.touch();
        Ok(self.handle(self.namespace_of(thread)))
    }

    fn open(&self, path: &Path) -> Result<FakeHandle, NamespaceError> {
        let name = path.display().to_string();
        if !self.stats.contains_key(&name) && !self.broken.contains(&name) {
            return Err(NamespaceError::Open {
                path: path.to_path_buf(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            });
        }
        Ok(self.handle(name))
    }

    fn enter(&self, handle: &FakeHandle) -> Result<(), NamespaceError> {
        if self.broken.contains(&handle.name) {
            return Err(NamespaceError::Enter(Errno::EPERM));
        }
        let thread = self.touch();
        self.threads
            .lock()
            .unwrap()
            .insert(thread, handle.name.clone());
        self.entered.lock().unwrap().push(handle.name.clone());
        self.show(&handle.name);
        // No lock is held here, so unwinding poisons nothing.
        if self.panicking.contains(&handle.name) {
            panic!("reading inside {} blew up", handle.name);
        }
        Ok(())
    }
}

/// Host plus a set of containers, wired into a collector.
pub struct Fixture {
    pub dir: TempDir,
    pub runtime: FakeRuntime,
    pub namespaces: FakeNamespaces,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let namespaces = FakeNamespaces::new(&dir.path().join("netstat"));
        Self {
            dir,
            runtime: FakeRuntime::default(),
            namespaces,
        }
    }

    pub fn netstat_path(&self) -> PathBuf {
        self.dir.path().join("netstat")
    }

    /// Adds a running container whose namespace shows `netstat` (None: no file).
    pub fn container(mut self, id: &str, name: &str, netstat: Option<String>) -> Self {
        self.runtime.containers.push(RunningContainer {
            id: id.to_string(),
            names: vec![name.to_string()],
        });
        let path = ns_path(id);
        self.runtime.namespaces.insert(id.to_string(), path.clone());
        self.namespaces
            .stats
            .insert(path.display().to_string(), netstat);
        self
    }

    /// Adds a running container whose namespace can be opened but not entered.
    pub fn unenterable_container(mut self, id: &str, name: &str) -> Self {
        self = self.container(id, name, Some(netstat_text(0, 0)));
        self.namespaces.broken.insert(ns_path(id).display().to_string());
        self
    }

    /// Adds a running container whose namespace panics the thread once entered.
    pub fn panicking_container(mut self, id: &str, name: &str) -> Self {
        self = self.container(id, name, Some(netstat_text(0, 0)));
        self.namespaces.panicking.insert(ns_path(id).display().to_string());
        self
    }

    /// Adds a container that is listed but exits before its namespace is looked up.
    pub fn vanished_container(mut self, id: &str, name: &str) -> Self {
        self.runtime.containers.push(RunningContainer {
            id: id.to_string(),
            names: vec![name.to_string()],
        });
        self
    }

    pub fn into_collector(self) -> (TempDir, Arc<FakeNamespaces>, Collector<FakeRuntime, FakeNamespaces>) {
        let netstat_path = self.netstat_path();
        let namespaces = Arc::new(self.namespaces);
        let collector = Collector::new(Arc::new(self.runtime), namespaces.clone(), netstat_path);
        (self.dir, namespaces, collector)
    }
}

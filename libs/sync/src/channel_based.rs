use std::{
    ops::ControlFlow,
    thread::{self, JoinHandle},
};

use anyhow::{Context, anyhow};
use crossbeam::channel::{Receiver, Sender};
use log::{debug, warn};
use pqueue::{IndexedHeap, Item, ItemKey, MinFirst, Order, PriorityQueue, QueueError, Result};

type Reply<T> = Sender<T>;

/// Requests the worker serves, each carrying the channel its answer goes back on.
enum Command<V, P> {
    Len(Reply<usize>),
    Push(Item<V, P>, Reply<ItemKey>),
    Pop(Reply<Result<Item<V, P>>>),
    Peek(Reply<Result<Item<V, P>>>),
    Update {
        key: ItemKey,
        value: V,
        priority: P,
        reply: Reply<Result<()>>,
    },
    Remove(ItemKey, Reply<Result<Item<V, P>>>),
    Drain(usize, Reply<Vec<Item<V, P>>>),
    Validate(Reply<Result<()>>),
    Stop(Reply<Vec<Item<V, P>>>),
}

/// Worker side: the only owner of the heap, so no lock is needed around it.
struct Storage<V, P, O> {
    heap: IndexedHeap<V, P, O>,
    command_sink: Receiver<Command<V, P>>,
}

impl<V: Clone, P: Clone, O: Order<P>> Storage<V, P, O> {
    /// Blocks the thread it is running on, serving commands until it is told to stop or every
    /// handle to the queue is gone.
    fn run(mut self) {
        debug!("queue {} worker started", self.heap.id());

        while let Ok(command) = self.command_sink.recv() {
            match self.serve(command) {
                Ok(ControlFlow::Continue(())) => (),
                Ok(ControlFlow::Break(())) => break,
                Err(e) => warn!("queue {}: {e:#}", self.heap.id()),
            }
        }

        debug!(
            "queue {} worker stopped with {} items left",
            self.heap.id(),
            self.heap.len()
        );
    }

    /// Executes one command and delivers its reply.
    /// # Error
    /// Returns an error if the requester hung up before the reply could be delivered. The
    /// operation itself has already been applied at that point.
    fn serve(&mut self, command: Command<V, P>) -> anyhow::Result<ControlFlow<()>> {
        match command {
            Command::Len(reply) => send(reply, self.heap.len(), "len")?,
            Command::Push(item, reply) => send(reply, self.heap.push(item), "push")?,
            Command::Pop(reply) => send(reply, self.heap.pop(), "pop")
                .context("popped item is thrown away")?,
            Command::Peek(reply) => send(reply, self.heap.peek().cloned(), "peek")?,
            Command::Update {
                key,
                value,
                priority,
                reply,
            } => send(reply, self.heap.update(key, value, priority), "update")?,
            Command::Remove(key, reply) => send(reply, self.heap.remove(key), "remove")
                .context("removed item is thrown away")?,
            Command::Drain(n, reply) => send(reply, self.heap.drain(n), "drain")
                .context("drained items are thrown away")?,
            Command::Validate(reply) => send(
                reply,
                self.heap.validate().map_err(QueueError::from),
                "validate",
            )?,
            Command::Stop(reply) => {
                let remaining = self.heap.drain(self.heap.len());
                send(reply, remaining, "stop").context("remaining items are thrown away")?;
                return Ok(ControlFlow::Break(()));
            }
        }
        Ok(ControlFlow::Continue(()))
    }
}

fn send<T>(reply: Reply<T>, value: T, op: &str) -> anyhow::Result<()> {
    reply
        .send(value)
        .map_err(|_| anyhow!("requester hung up before the {op} reply was delivered"))
}

/// Priority queue whose heap is owned by a dedicated worker thread.
///
/// Callers never touch the heap; they send commands and wait for the reply, so all operations
/// are serialized by the worker's command channel. Dropping every handle stops the worker.
pub struct ChanneledQueue<V, P = i64> {
    command_source: Sender<Command<V, P>>,
    runner_handle: JoinHandle<()>,
}

impl<V, P> ChanneledQueue<V, P>
where
    V: Clone + Send + 'static,
    P: Clone + Send + 'static,
{
    pub fn new(capacity: usize) -> anyhow::Result<Self>
    where
        P: Ord,
    {
        Self::with_order(capacity, MinFirst)
    }

    /// Spawns the worker thread; `order` moves into it together with the heap.
    pub fn with_order<O>(capacity: usize, order: O) -> anyhow::Result<Self>
    where
        O: Order<P> + Send + 'static,
    {
        let (command_source, command_sink) = crossbeam::channel::unbounded();
        let storage = Storage {
            heap: IndexedHeap::with_capacity_and_order(capacity, order),
            command_sink,
        };

        let runner_handle = thread::Builder::new()
            .name(format!("pqueue-{}", storage.heap.id()))
            .spawn(move || storage.run())
            .context("could not spawn queue worker")?;

        Ok(Self {
            command_source,
            runner_handle,
        })
    }

    /// Sends a command built around a fresh reply channel and waits for the answer.
    fn request<T>(&self, command: impl FnOnce(Reply<T>) -> Command<V, P>) -> Result<T> {
        let (reply, response) = crossbeam::channel::bounded(1);
        self.command_source
            .send(command(reply))
            .map_err(|_| QueueError::Disconnected)?;
        response.recv().map_err(|_| QueueError::Disconnected)
    }

    /// Stops the worker and hands back every item that was still queued, in pop order.
    pub fn stop(self) -> anyhow::Result<Vec<Item<V, P>>> {
        let remaining = self
            .request(Command::Stop)
            .context("queue worker is not listening")?;

        self.runner_handle
            .join()
            .map_err(|_| anyhow!("queue worker panicked"))?;
        Ok(remaining)
    }
}

impl<V, P> PriorityQueue<V, P> for ChanneledQueue<V, P>
where
    V: Clone + Send + 'static,
    P: Clone + Send + 'static,
{
    fn len(&self) -> Result<usize> {
        self.request(Command::Len)
    }

    fn push(&self, item: Item<V, P>) -> Result<ItemKey> {
        self.request(|reply| Command::Push(item, reply))
    }

    fn pop(&self) -> Result<Item<V, P>> {
        self.request(Command::Pop)?
    }

    fn peek(&self) -> Result<Item<V, P>> {
        self.request(Command::Peek)?
    }

    fn update(&self, key: ItemKey, value: V, priority: P) -> Result<()> {
        self.request(|reply| Command::Update {
            key,
            value,
            priority,
            reply,
        })?
    }

    fn remove(&self, key: ItemKey) -> Result<Item<V, P>> {
        self.request(|reply| Command::Remove(key, reply))?
    }

    fn drain(&self, n: usize) -> Result<Vec<Item<V, P>>> {
        self.request(|reply| Command::Drain(n, reply))
    }

    fn validate(&self) -> Result<()> {
        self.request(Command::Validate)?
    }
}

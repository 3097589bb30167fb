//! Single-threaded message loop used to host the navigation components.

use std::{
    fmt::Display,
    thread::{self, JoinHandle},
    time::Instant,
};

use crossbeam_channel::{bounded, unbounded, Receiver, RecvTimeoutError, SendError, Sender};

use crate::error::Error;

/// What the loop should do after a message has been handled.
pub enum Act<T: Actor> {
    Continue,
    /// Keep receiving until `deadline`, then handle `timeout_msg` unless a
    /// message arrived first. The next `handle` result replaces the deadline.
    WaitUntil {
        deadline: Instant,
        timeout_msg: T::Message,
    },
    Shutdown,
}

pub trait Actor: Sized {
    type Message: Send + 'static;
    type Error: Display;

    fn handle(&mut self, msg: Self::Message) -> Result<Act<Self>, Self::Error>;

    /// Runs until `Act::Shutdown`, a handler error, or every sender is gone.
    fn process(mut self, recv: Receiver<Self::Message>) {
        let mut act = Act::Continue;
        loop {
            let received = match act {
                Act::Continue => recv.recv().ok(),
                Act::WaitUntil {
                    deadline,
                    timeout_msg,
                } => match recv.recv_deadline(deadline) {
                    Ok(msg) => Some(msg),
                    Err(RecvTimeoutError::Timeout) => Some(timeout_msg),
                    Err(RecvTimeoutError::Disconnected) => None,
                },
                Act::Shutdown => break,
            };
            let Some(msg) = received else {
                log::debug!("all senders dropped, stopping");
                break;
            };
            act = match self.handle(msg) {
                Ok(act) => act,
                Err(err) => {
                    log::error!("actor failed: {}", err);
                    break;
                }
            };
        }
    }

    /// Starts the loop on a named thread. `factory` runs on that thread and
    /// receives a sender into the actor's own mailbox, so the actor may hold
    /// non-`Send` state such as render targets.
    fn spawn<F>(name: &str, cap: Capacity, factory: F) -> Result<ActorHandle<Self::Message>, Error>
    where
        F: FnOnce(Sender<Self::Message>) -> Self + Send + 'static,
    {
        let (send, recv) = cap.to_channel();
        let mailbox = send.clone();
        let thread = thread::Builder::new()
            .name(name.to_owned())
            .spawn(move || factory(mailbox).process(recv))?;
        Ok(ActorHandle {
            sender: send,
            thread,
        })
    }
}

pub struct ActorHandle<M> {
    thread: JoinHandle<()>,
    sender: Sender<M>,
}

impl<M> ActorHandle<M> {
    pub fn sender(&self) -> Sender<M> {
        self.sender.clone()
    }

    pub fn send(&self, msg: M) -> Result<(), SendError<M>> {
        self.sender.send(msg)
    }

    pub fn join(self) {
        if self.thread.join().is_err() {
            log::error!("actor thread panicked");
        }
    }
}

pub enum Capacity {
    Bounded(usize),
    Unbounded,
}

impl Capacity {
    fn to_channel<T>(&self) -> (Sender<T>, Receiver<T>) {
        match self {
            Capacity::Bounded(cap) => bounded(*cap),
            Capacity::Unbounded => unbounded(),
        }
    }
}

use crate::rc::MutArc;
use std::collections::VecDeque;

type Task<O> = Box<dyn FnOnce(&mut Option<O>) + Send>;

struct Backlog<O> {
  draining: bool,
  tasks: VecDeque<Task<O>>,
}

/// Hands signals to one observer, one at a time and in submission order.
///
/// A task submitted while another one runs, from another thread or from
/// inside the running callback, is queued and run by the thread that is
/// already delivering. Submitting never waits for a callback, and a callback
/// may emit into the observer it is running on.
pub(crate) struct Delivery<O> {
  observer: MutArc<Option<O>>,
  backlog: MutArc<Backlog<O>>,
}

impl<O> Clone for Delivery<O> {
  fn clone(&self) -> Self {
    Delivery { observer: self.observer.clone(), backlog: self.backlog.clone() }
  }
}

impl<O> Delivery<O> {
  pub(crate) fn new(observer: O) -> Self {
    Delivery {
      observer: MutArc::own(Some(observer)),
      backlog: MutArc::own(Backlog { draining: false, tasks: VecDeque::new() }),
    }
  }

  /// Runs `task` against the observer slot. The slot is `None` once a
  /// terminal task took the observer out.
  pub(crate) fn submit<T>(&self, task: T)
  where
    T: FnOnce(&mut Option<O>) + Send + 'static,
  {
    {
      let mut backlog = self.backlog.rc_deref_mut();
      if backlog.draining {
        backlog.tasks.push_back(Box::new(task));
        return;
      }
      backlog.draining = true;
    }
    self.run(task);
    loop {
      let task = {
        let mut backlog = self.backlog.rc_deref_mut();
        match backlog.tasks.pop_front() {
          Some(task) => task,
          None => {
            backlog.draining = false;
            return;
          }
        }
      };
      self.run(task);
    }
  }

  /// Reads the observer slot unless a delivery is running right now.
  pub(crate) fn peek<R>(&self, f: impl FnOnce(&Option<O>) -> R) -> Option<R> {
    self.observer.try_rc_deref_mut().map(|observer| f(&observer))
  }

  fn run<T: FnOnce(&mut Option<O>)>(&self, task: T) {
    let mut observer = self.observer.rc_deref_mut();
    task(&mut *observer)
  }
}

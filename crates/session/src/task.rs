use std::future::Future;
use std::sync::OnceLock;

use tokio::runtime::{Builder, Handle, Runtime};
use tokio::task::JoinHandle;

/// Hosts sessions opened from outside any tokio runtime.
static DETACHED: OnceLock<Runtime> = OnceLock::new();

/// Sessions only need timers and the blocking pool for file persistence.
fn detached_runtime() -> &'static Runtime {
	DETACHED.get_or_init(|| {
		Builder::new_multi_thread()
			.enable_time()
			.worker_threads(1)
			.max_blocking_threads(4)
			.thread_name("textor-session")
			.build()
			.unwrap_or_else(|err| panic!("failed to build detached session runtime: {err}"))
	})
}

/// Spawns a session task on the caller's runtime, or on the detached session
/// runtime when there is none.
pub(crate) fn spawn_session<F>(location: &str, fut: F) -> JoinHandle<F::Output>
where
	F: Future + Send + 'static,
	F::Output: Send + 'static,
{
	match Handle::try_current() {
		Ok(handle) => {
			tracing::trace!(location, detached = false, "session.spawn");
			handle.spawn(fut)
		}
		Err(_) => {
			tracing::trace!(location, detached = true, "session.spawn");
			detached_runtime().spawn(fut)
		}
	}
}

#[cfg(test)]
mod tests {
	use std::time::Duration;

	use super::*;

	#[test]
	fn detached_sessions_get_timers() {
		let handle = spawn_session("/outside", async {
			tokio::time::sleep(Duration::from_millis(1)).await;
			7
		});
		let value = std::thread::spawn(move || {
			tokio::runtime::Builder::new_current_thread()
				.build()
				.unwrap()
				.block_on(handle)
				.unwrap()
		})
		.join()
		.unwrap();
		assert_eq!(value, 7);
	}
}

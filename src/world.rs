use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;
use tokio::sync::oneshot;
use tracing::debug;
use tracing::info;

use crate::grid::Grid;
use crate::rules;

/// Owner of the one shared automaton.
pub struct World {
    /// The current generation. Shared read-only with whoever asked for it; stepping replaces the
    /// `Arc` instead of writing through it.
    grid: Arc<Grid>,

    /// Number of steps applied since seeding
    generation: u64,
}

impl World {
    pub fn new(grid: Grid) -> Self {
        Self {
            grid: Arc::new(grid),
            generation: 0,
        }
    }

    /// Seed a `side x side` world with the given live cell density. `seed` makes the initial
    /// grid reproducible.
    pub fn seeded(side: usize, density: f64, seed: Option<u64>) -> Self {
        let mut rng = match seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };

        Self::new(Grid::random(side, density, &mut rng))
    }

    pub fn grid(&self) -> Arc<Grid> {
        Arc::clone(&self.grid)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Advance exactly one generation and return it
    pub fn next(&mut self) -> Arc<Grid> {
        self.grid = Arc::new(rules::step(&self.grid));
        self.generation += 1;

        debug!(
            generation = self.generation,
            population = self.grid.population(),
            "stepped world"
        );

        self.grid()
    }
}

#[derive(Debug, Error)]
pub enum WorldError {
    #[error("World task is no longer running")]
    Closed,
}

enum Request {
    Snapshot(oneshot::Sender<Arc<Grid>>),
    Step(oneshot::Sender<Arc<Grid>>),
}

/// Cloneable handle to a [`World`] running in its own task.
///
/// The task is the only writer. Requests from every handle go through one queue and are applied
/// one at a time in arrival order, so two sessions can never step the grid concurrently.
#[derive(Clone)]
pub struct WorldHandle {
    tx: mpsc::Sender<Request>,
}

impl WorldHandle {
    /// Move `world` into a new task. The task stops once every handle is dropped.
    pub fn spawn(mut world: World) -> Self {
        let (tx, mut rx) = mpsc::channel::<Request>(64);

        tokio::spawn(async move {
            while let Some(req) = rx.recv().await {
                // A dropped receiver means the session went away mid request. The step
                // still counts.
                let _ = match req {
                    Request::Snapshot(reply) => reply.send(world.grid()),
                    Request::Step(reply) => reply.send(world.next()),
                };
            }

            info!(generation = world.generation(), "world task finished");
        });

        Self { tx }
    }

    /// The current generation, without stepping
    pub async fn snapshot(&self) -> Result<Arc<Grid>, WorldError> {
        self.request(Request::Snapshot).await
    }

    /// Advance the shared world by one generation and return the result
    pub async fn step(&self) -> Result<Arc<Grid>, WorldError> {
        self.request(Request::Step).await
    }

    async fn request<F>(&self, make: F) -> Result<Arc<Grid>, WorldError>
    where
        F: FnOnce(oneshot::Sender<Arc<Grid>>) -> Request,
    {
        let (reply, rx) = oneshot::channel();

        self.tx
            .send(make(reply))
            .await
            .map_err(|_| WorldError::Closed)?;

        rx.await.map_err(|_| WorldError::Closed)
    }
}

#[cfg(test)]
mod tests {
    use super::World;
    use super::WorldHandle;
    use crate::grid::Grid;
    use crate::rules;

    fn blinker() -> Grid {
        ".....
         .....
         .OOO.
         .....
         ....."
            .parse()
            .unwrap()
    }

    #[test]
    fn next_replaces_grid_and_counts() {
        let mut world = World::new(blinker());
        let before = world.grid();

        let after = world.next();

        assert_eq!(world.generation(), 1);
        assert_eq!(*after, rules::step(&before));
        // earlier snapshots are untouched
        assert_eq!(*before, blinker());
    }

    #[test]
    fn seeded_is_reproducible() {
        let a = World::seeded(32, 0.3, Some(9));
        let b = World::seeded(32, 0.3, Some(9));

        assert_eq!(a.grid(), b.grid());
        assert_eq!(a.grid().side(), 32);
    }

    #[tokio::test]
    async fn handle_steps_once_per_request() {
        let world = WorldHandle::spawn(World::new(blinker()));

        let g0 = world.snapshot().await.unwrap();
        let g1 = world.step().await.unwrap();
        let again = world.snapshot().await.unwrap();
        let g2 = world.step().await.unwrap();

        assert_eq!(*g1, rules::step(&g0));
        assert_eq!(g1, again);
        assert_eq!(*g2, *g0);
    }

    #[tokio::test]
    async fn shared_between_handles() {
        let a = WorldHandle::spawn(World::new(blinker()));
        let b = a.clone();

        a.step().await.unwrap();

        assert_eq!(*b.snapshot().await.unwrap(), rules::step(&blinker()));
    }
}

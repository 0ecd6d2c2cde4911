use std::io;
use std::path::Path;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::net::model::NetParams;
use crate::net::serializer;

/// The narrow contract the model tools depend on: build the model state
/// once, then export its current parameters. Implementations own everything
/// behind these two calls.
pub trait ModelProcess {
    fn init(&mut self, batch_size: usize, gpus_num: usize) -> io::Result<()>;
    fn save_weights(&self, path: &Path) -> io::Result<()>;
}

/// Holds the parameters of a freshly constructed residual network. Until
/// [`init`] is called no parameters exist and exporting fails.
///
/// [`init`]: ModelProcess::init
pub struct NetProcess {
    residual_blocks: usize,
    residual_filters: usize,
    params: Option<NetParams>,
}

impl NetProcess {
    pub fn new(residual_blocks: usize, residual_filters: usize) -> NetProcess {
        NetProcess {
            residual_blocks,
            residual_filters,
            params: None,
        }
    }

    pub fn params(&self) -> Option<&NetParams> {
        self.params.as_ref()
    }
}

impl ModelProcess for NetProcess {
    fn init(&mut self, batch_size: usize, gpus_num: usize) -> io::Result<()> {
        if batch_size == 0 || gpus_num == 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "batch_size and gpus_num must be at least 1",
            ));
        }
        if self.params.is_some() {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                "model process is already initialized",
            ));
        }

        log::info!(
            "Building model: {} residual blocks, {} filters (batch_size={}, gpus_num={})",
            self.residual_blocks,
            self.residual_filters,
            batch_size,
            gpus_num
        );
        let mut rng = StdRng::from_entropy();
        let params = NetParams::new_random(self.residual_blocks, self.residual_filters, &mut rng);
        log::debug!("Model has {} parameters", params.num_params());
        self.params = Some(params);
        Ok(())
    }

    fn save_weights(&self, path: &Path) -> io::Result<()> {
        let params = self.params.as_ref().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::Other,
                "save_weights called on an uninitialized model process",
            )
        })?;
        log::info!("Saving weights to {}", path.display());
        serializer::write_weights(params, path)
    }
}

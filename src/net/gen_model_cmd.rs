use std::io;
use std::path::{Path, PathBuf};

use clap::Parser;

use crate::config::Settings;
use crate::net::process::{ModelProcess, NetProcess};

/// The generated model state is sized for a single sample on a single
/// device, matching how the training pipeline bootstraps a new run.
const BATCH_SIZE: usize = 1;
const GPUS_NUM: usize = 1;

#[derive(Parser, Debug)]
#[clap(about, long_about = None)]
struct GenModelArgs {
    #[clap(long)]
    settings: Option<PathBuf>,
    #[clap(long, default_value = "restored.txt")]
    out: PathBuf,
}

pub trait IModelBuilder: Sync + Send {
    fn build_process(&self, residual_blocks: usize, residual_filters: usize)
        -> Box<dyn ModelProcess>;
}

struct NetProcessBuilder;

impl IModelBuilder for NetProcessBuilder {
    fn build_process(
        &self,
        residual_blocks: usize,
        residual_filters: usize,
    ) -> Box<dyn ModelProcess> {
        Box::new(NetProcess::new(residual_blocks, residual_filters))
    }
}

/// Build a model process for the configured architecture, initialize it once
/// and export its freshly initialized weights. The sequence is fixed, any
/// failure aborts the remaining steps.
pub fn generate_model(
    settings: &Settings,
    builder: &dyn IModelBuilder,
    out_path: &Path,
) -> io::Result<()> {
    let mut process = builder.build_process(settings.residual_blocks, settings.residual_filters);
    process.init(BATCH_SIZE, GPUS_NUM)?;
    process.save_weights(out_path)
}

pub fn run_main() -> io::Result<()> {
    let args = GenModelArgs::parse();

    let settings = match &args.settings {
        Some(path) => Settings::from_file(path)?,
        None => Settings::default(),
    };
    log::info!(
        "Generating model: {} residual blocks, {} residual filters",
        settings.residual_blocks,
        settings.residual_filters
    );

    generate_model(&settings, &NetProcessBuilder, &args.out)?;
    log::info!("Weights written to {}", args.out.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::serializer;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, PartialEq, Eq, Debug)]
    enum Event {
        Build { blocks: usize, filters: usize },
        Init { batch_size: usize, gpus_num: usize },
        Save { path: PathBuf },
    }

    #[derive(Clone, Copy)]
    enum FailAt {
        Nowhere,
        Init,
        Save,
    }

    struct RecordingProcess {
        events: Arc<Mutex<Vec<Event>>>,
        fail_at: FailAt,
    }

    impl ModelProcess for RecordingProcess {
        fn init(&mut self, batch_size: usize, gpus_num: usize) -> io::Result<()> {
            self.events.lock().unwrap().push(Event::Init {
                batch_size,
                gpus_num,
            });
            match self.fail_at {
                FailAt::Init => Err(io::Error::new(io::ErrorKind::Other, "graph setup failed")),
                _ => Ok(()),
            }
        }

        fn save_weights(&self, path: &Path) -> io::Result<()> {
            self.events.lock().unwrap().push(Event::Save {
                path: path.to_path_buf(),
            });
            match self.fail_at {
                FailAt::Save => Err(io::Error::new(io::ErrorKind::Other, "disk full")),
                _ => Ok(()),
            }
        }
    }

    struct RecordingBuilder {
        events: Arc<Mutex<Vec<Event>>>,
        fail_at: FailAt,
    }

    impl RecordingBuilder {
        fn new(fail_at: FailAt) -> RecordingBuilder {
            RecordingBuilder {
                events: Arc::new(Mutex::new(vec![])),
                fail_at,
            }
        }

        fn events(&self) -> Vec<Event> {
            self.events.lock().unwrap().clone()
        }
    }

    impl IModelBuilder for RecordingBuilder {
        fn build_process(
            &self,
            residual_blocks: usize,
            residual_filters: usize,
        ) -> Box<dyn ModelProcess> {
            self.events.lock().unwrap().push(Event::Build {
                blocks: residual_blocks,
                filters: residual_filters,
            });
            Box::new(RecordingProcess {
                events: Arc::clone(&self.events),
                fail_at: self.fail_at,
            })
        }
    }

    #[test]
    fn settings_pass_through_and_call_order() {
        for (blocks, filters) in [(6, 64), (3, 32), (0, 1)] {
            let settings = Settings {
                residual_blocks: blocks,
                residual_filters: filters,
            };
            let builder = RecordingBuilder::new(FailAt::Nowhere);
            generate_model(&settings, &builder, Path::new("restored.txt")).unwrap();

            assert_eq!(
                builder.events(),
                vec![
                    Event::Build { blocks, filters },
                    Event::Init {
                        batch_size: 1,
                        gpus_num: 1
                    },
                    Event::Save {
                        path: PathBuf::from("restored.txt")
                    },
                ]
            );
        }
    }

    #[test]
    fn init_failure_stops_export() {
        let builder = RecordingBuilder::new(FailAt::Init);
        let res = generate_model(&Settings::default(), &builder, Path::new("restored.txt"));
        assert!(res.is_err());
        assert!(!builder
            .events()
            .iter()
            .any(|e| matches!(e, Event::Save { .. })));
    }

    #[test]
    fn save_failure_propagates() {
        let builder = RecordingBuilder::new(FailAt::Save);
        let res = generate_model(&Settings::default(), &builder, Path::new("restored.txt"));
        assert!(res.is_err());
    }

    #[test]
    fn generates_default_architecture_weights() {
        let out_path = std::env::temp_dir().join(format!(
            "gomoku-zero-gen-model-test-{}-restored.txt",
            std::process::id()
        ));

        generate_model(&Settings::default(), &NetProcessBuilder, &out_path).unwrap();
        let weights = serializer::read_weights(&out_path).unwrap();
        std::fs::remove_file(&out_path).unwrap();

        assert_eq!(weights.version, serializer::WEIGHTS_VERSION);
        assert_eq!(weights.residual_blocks, 6);
        assert_eq!(weights.residual_filters, 64);

        /* freshly initialized, not a restored checkpoint: biases and
         * batchnorm statistics still have their construction-time values */
        let input_conv_biases = &weights.tensors[1];
        let input_conv_bn_vars = &weights.tensors[3];
        assert!(input_conv_biases.iter().all(|&v| v == 0.0));
        assert!(input_conv_bn_vars.iter().all(|&v| v == 1.0));
    }
}

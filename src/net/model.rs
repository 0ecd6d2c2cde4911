use itertools::Itertools;
use ndarray::{Array1, Array2, Array4};
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};

use crate::game::board::NUM_INTERSECTIONS;
use crate::net::common::INPUT_PLANES;

pub const POLICY_PLANES: usize = 2;
pub const VALUE_PLANES: usize = 1;
pub const VALUE_HIDDEN: usize = 256;
/// One policy output per intersection plus one for pass.
pub const POLICY_OUTPUTS: usize = NUM_INTERSECTIONS + 1;

/// Xavier initialization: zero-mean normal with stddev derived from the
/// tensor shape, redrawing any sample beyond two standard deviations.
fn random_values(shape_sum: usize, len: usize, rng: &mut StdRng) -> Vec<f32> {
    let stddev = (2.0 / shape_sum as f32).sqrt();
    let normal = Normal::new(0.0, stddev).unwrap();
    (0..len)
        .map(|_| loop {
            let v = normal.sample(rng);
            if v.abs() <= 2.0 * stddev {
                break v;
            }
        })
        .collect_vec()
}

/// One convolution with its batch-normalization statistics: four tensors, in
/// the order they appear in the weights file.
pub struct ConvBlock {
    pub weights: Array4<f32>,
    pub biases: Array1<f32>,
    pub bn_means: Array1<f32>,
    pub bn_vars: Array1<f32>,
}

impl ConvBlock {
    fn new_random(inputs: usize, outputs: usize, kernel_size: usize, rng: &mut StdRng) -> ConvBlock {
        let len = outputs * inputs * kernel_size * kernel_size;
        let shape_sum = inputs + outputs + 2 * kernel_size;
        ConvBlock {
            weights: Array4::from_shape_vec(
                (outputs, inputs, kernel_size, kernel_size),
                random_values(shape_sum, len, rng),
            )
            .unwrap(),
            biases: Array1::zeros(outputs),
            bn_means: Array1::zeros(outputs),
            bn_vars: Array1::ones(outputs),
        }
    }

    fn tensors(&self) -> [&[f32]; 4] {
        [
            self.weights.as_slice().unwrap(),
            self.biases.as_slice().unwrap(),
            self.bn_means.as_slice().unwrap(),
            self.bn_vars.as_slice().unwrap(),
        ]
    }
}

pub struct FcLayer {
    /// Stored as [outputs, inputs], the layout of the weights file.
    pub weights: Array2<f32>,
    pub biases: Array1<f32>,
}

impl FcLayer {
    fn new_random(inputs: usize, outputs: usize, rng: &mut StdRng) -> FcLayer {
        FcLayer {
            weights: Array2::from_shape_vec(
                (outputs, inputs),
                random_values(inputs + outputs, outputs * inputs, rng),
            )
            .unwrap(),
            biases: Array1::zeros(outputs),
        }
    }

    fn tensors(&self) -> [&[f32]; 2] {
        [
            self.weights.as_slice().unwrap(),
            self.biases.as_slice().unwrap(),
        ]
    }
}

pub struct ResidualBlock {
    pub conv1: ConvBlock,
    pub conv2: ConvBlock,
}

/// All parameters of the residual network: input convolution, residual
/// tower, policy head and value head.
pub struct NetParams {
    pub input_conv: ConvBlock,
    pub residual_blocks: Vec<ResidualBlock>,
    pub policy_conv: ConvBlock,
    pub policy_fc: FcLayer,
    pub value_conv: ConvBlock,
    pub value_fc1: FcLayer,
    pub value_fc2: FcLayer,
}

impl NetParams {
    pub fn new_random(blocks: usize, filters: usize, rng: &mut StdRng) -> NetParams {
        assert!(filters > 0, "filter count must be positive");
        NetParams {
            input_conv: ConvBlock::new_random(INPUT_PLANES, filters, 3, rng),
            residual_blocks: (0..blocks)
                .map(|_| ResidualBlock {
                    conv1: ConvBlock::new_random(filters, filters, 3, rng),
                    conv2: ConvBlock::new_random(filters, filters, 3, rng),
                })
                .collect_vec(),
            policy_conv: ConvBlock::new_random(filters, POLICY_PLANES, 1, rng),
            policy_fc: FcLayer::new_random(POLICY_PLANES * NUM_INTERSECTIONS, POLICY_OUTPUTS, rng),
            value_conv: ConvBlock::new_random(filters, VALUE_PLANES, 1, rng),
            value_fc1: FcLayer::new_random(VALUE_PLANES * NUM_INTERSECTIONS, VALUE_HIDDEN, rng),
            value_fc2: FcLayer::new_random(VALUE_HIDDEN, 1, rng),
        }
    }

    pub fn blocks(&self) -> usize {
        self.residual_blocks.len()
    }

    pub fn filters(&self) -> usize {
        self.input_conv.biases.len()
    }

    /// All tensors in weights-file order, one file line each.
    pub fn tensors(&self) -> Vec<&[f32]> {
        let mut tensors: Vec<&[f32]> = vec![];
        tensors.extend(self.input_conv.tensors());
        for block in &self.residual_blocks {
            tensors.extend(block.conv1.tensors());
            tensors.extend(block.conv2.tensors());
        }
        tensors.extend(self.policy_conv.tensors());
        tensors.extend(self.policy_fc.tensors());
        tensors.extend(self.value_conv.tensors());
        tensors.extend(self.value_fc1.tensors());
        tensors.extend(self.value_fc2.tensors());
        tensors
    }

    pub fn num_params(&self) -> usize {
        self.tensors().iter().map(|t| t.len()).sum()
    }
}

fn conv_sizes(inputs: usize, outputs: usize, kernel_size: usize) -> [usize; 4] {
    [
        outputs * inputs * kernel_size * kernel_size,
        outputs,
        outputs,
        outputs,
    ]
}

/// Element count of each weights-file line (after the version line) for the
/// given architecture.
pub fn tensor_sizes(blocks: usize, filters: usize) -> Vec<usize> {
    let mut sizes = vec![];
    sizes.extend(conv_sizes(INPUT_PLANES, filters, 3));
    for _ in 0..blocks {
        sizes.extend(conv_sizes(filters, filters, 3));
        sizes.extend(conv_sizes(filters, filters, 3));
    }
    sizes.extend(conv_sizes(filters, POLICY_PLANES, 1));
    sizes.extend([
        POLICY_PLANES * NUM_INTERSECTIONS * POLICY_OUTPUTS,
        POLICY_OUTPUTS,
    ]);
    sizes.extend(conv_sizes(filters, VALUE_PLANES, 1));
    sizes.extend([VALUE_PLANES * NUM_INTERSECTIONS * VALUE_HIDDEN, VALUE_HIDDEN]);
    sizes.extend([VALUE_HIDDEN, 1]);
    sizes
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn tensor_layout_matches_expected_sizes() {
        let mut rng = StdRng::seed_from_u64(0x00c0ffee);
        for (blocks, filters) in [(0, 2), (1, 2), (3, 16)] {
            let params = NetParams::new_random(blocks, filters, &mut rng);
            assert_eq!(params.blocks(), blocks);
            assert_eq!(params.filters(), filters);

            let sizes = tensor_sizes(blocks, filters);
            let tensors = params.tensors();
            assert_eq!(tensors.len(), sizes.len());
            assert_eq!(tensors.len(), 18 + 8 * blocks);
            for (tensor, size) in tensors.iter().zip(sizes) {
                assert_eq!(tensor.len(), size);
            }
        }
    }

    #[test]
    fn batchnorm_defaults() {
        let mut rng = StdRng::seed_from_u64(7);
        let params = NetParams::new_random(1, 4, &mut rng);

        assert!(params.input_conv.biases.iter().all(|&v| v == 0.0));
        assert!(params.input_conv.bn_means.iter().all(|&v| v == 0.0));
        assert!(params.input_conv.bn_vars.iter().all(|&v| v == 1.0));
        assert!(params.value_fc2.biases.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn weights_within_truncation_bound() {
        let mut rng = StdRng::seed_from_u64(11);
        let params = NetParams::new_random(1, 8, &mut rng);

        let inputs = INPUT_PLANES;
        let outputs = 8;
        let stddev = (2.0f32 / (inputs + outputs + 6) as f32).sqrt();
        let weights = params.input_conv.weights.as_slice().unwrap();
        assert!(weights.iter().all(|v| v.abs() <= 2.0 * stddev));
        assert!(weights.iter().any(|&v| v != 0.0));
    }
}

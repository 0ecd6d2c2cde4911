use std::fs;
use std::io;
use std::path::Path;

use itertools::Itertools;

use crate::net::common::INPUT_PLANES;
use crate::net::model::{self, NetParams};

/// Version number on the first line of the weights text format.
pub const WEIGHTS_VERSION: u32 = 1;

/// A 3x3 input convolution reads 9 cells per input plane.
const INPUT_CONV_WEIGHTS_PER_FILTER: usize = INPUT_PLANES * 9;

/// File lines outside the residual tower: the version line, the four input
/// convolution tensors and the fourteen head tensors.
const NON_RESIDUAL_LINES: usize = 1 + 4 + 14;
const LINES_PER_RESIDUAL: usize = 8;

/// Write all parameters as text: a version line, then one line of
/// space-separated decimal values per tensor.
pub fn write_weights(params: &NetParams, path: &Path) -> io::Result<()> {
    let mut out = String::new();
    out.push_str(&format!("{}\n", WEIGHTS_VERSION));
    for tensor in params.tensors() {
        out.push_str(&tensor.iter().join(" "));
        out.push('\n');
    }
    fs::write(path, out)
}

/// A parsed weights file. The architecture is not stored explicitly in the
/// format, it is recovered from the line count and the input convolution
/// size.
#[derive(Debug)]
pub struct WeightsFile {
    pub version: u32,
    pub residual_blocks: usize,
    pub residual_filters: usize,
    pub tensors: Vec<Vec<f32>>,
}

impl WeightsFile {
    pub fn num_params(&self) -> usize {
        self.tensors.iter().map(|t| t.len()).sum()
    }
}

pub fn read_weights(path: &Path) -> io::Result<WeightsFile> {
    let text = fs::read_to_string(path)?;
    parse_weights(&text)
}

pub fn parse_weights(text: &str) -> io::Result<WeightsFile> {
    let lines = text.lines().collect_vec();
    if lines.is_empty() {
        return Err(invalid_data("weights file is empty".to_string()));
    }

    let version = lines[0]
        .trim()
        .parse::<u32>()
        .map_err(|_| invalid_data(format!("bad version line: {:?}", lines[0])))?;
    if version != WEIGHTS_VERSION {
        return Err(invalid_data(format!(
            "unsupported weights version: {}",
            version
        )));
    }

    if lines.len() < NON_RESIDUAL_LINES
        || (lines.len() - NON_RESIDUAL_LINES) % LINES_PER_RESIDUAL != 0
    {
        return Err(invalid_data(format!(
            "unexpected number of lines in weights file: {}",
            lines.len()
        )));
    }
    let residual_blocks = (lines.len() - NON_RESIDUAL_LINES) / LINES_PER_RESIDUAL;

    let input_weights = lines[1].split_whitespace().count();
    if input_weights == 0 || input_weights % INPUT_CONV_WEIGHTS_PER_FILTER != 0 {
        return Err(invalid_data(format!(
            "input convolution has {} weights, expected a multiple of {}",
            input_weights, INPUT_CONV_WEIGHTS_PER_FILTER
        )));
    }
    let residual_filters = input_weights / INPUT_CONV_WEIGHTS_PER_FILTER;

    let sizes = model::tensor_sizes(residual_blocks, residual_filters);
    let mut tensors = Vec::with_capacity(sizes.len());
    for (idx, line) in lines[1..].iter().enumerate() {
        let line_num = idx + 2;
        let values = line
            .split_whitespace()
            .map(|v| v.parse::<f32>())
            .collect::<Result<Vec<f32>, _>>()
            .map_err(|e| invalid_data(format!("line {}: {}", line_num, e)))?;
        if values.len() != sizes[idx] {
            return Err(invalid_data(format!(
                "line {}: expected {} values, found {}",
                line_num,
                sizes[idx],
                values.len()
            )));
        }
        tensors.push(values);
    }

    Ok(WeightsFile {
        version,
        residual_blocks,
        residual_filters,
        tensors,
    })
}

fn invalid_data(msg: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg)
}

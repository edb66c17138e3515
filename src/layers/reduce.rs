//! Sum reduction layer.

use crate::error::Result;
use crate::layers::context::Context;
use crate::layers::r#trait::{Layer, LossOutput};
use crate::tensor::{scalar, scalar_value, Tensor};
use ndarray::{ArrayD, IxDyn};

/// Sums every element into a rank-0 tensor.
///
/// `Sum` can also terminate a graph: as a loss it ignores the target and
/// reports the sum as the loss with its input as the prediction. Its backward
/// broadcasts the upstream scalar (1 at the root) to the staged input shape.
#[derive(Debug)]
pub struct Sum {
    ctx: Context<Vec<usize>>,
    training: bool,
}

impl Sum {
    pub fn new() -> Self {
        Self {
            ctx: Context::new(),
            training: true,
        }
    }
}

impl Default for Sum {
    fn default() -> Self {
        Self::new()
    }
}

impl Layer for Sum {
    fn name(&self) -> &'static str {
        "Sum"
    }

    fn forward(&mut self, input: &Tensor) -> Result<Tensor> {
        self.ctx.save_for_backward(input.shape().to_vec());
        Ok(scalar(input.sum()))
    }

    fn forward_with_target(&mut self, input: &Tensor, _target: &Tensor) -> Result<LossOutput> {
        let loss = self.forward(input)?;
        Ok(LossOutput {
            loss: scalar_value("sum forward", &loss)?,
            prediction: input.clone(),
        })
    }

    fn is_loss(&self) -> bool {
        true
    }

    fn backward(&mut self, grad_output: Option<&Tensor>) -> Result<Tensor> {
        let shape = self.ctx.pop("Sum")?;
        let upstream = match grad_output {
            Some(grad) => scalar_value("sum backward", grad)?,
            None => 1.0,
        };
        Ok(ArrayD::from_elem(IxDyn(&shape), upstream))
    }

    fn reset(&mut self) {
        self.ctx.clear();
    }

    fn set_training(&mut self, training: bool) {
        self.training = training;
    }

    fn is_training(&self) -> bool {
        self.training
    }
}

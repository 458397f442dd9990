use burn::{
    nn::{
        loss::CrossEntropyLossConfig,
        Linear, LinearConfig,
        Lstm, LstmConfig, LstmState,
    },
    prelude::*,
    tensor::activation::softmax,
};

/// Per-layer recurrent state carried between calls
pub type RnnState<B> = Vec<LstmState<B, 2>>;

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
// internally — do NOT add them again or you get conflicting impls.
#[derive(Config, Debug)]
pub struct CharRnnConfig {
    pub vocab_size:  usize,
    pub hidden_size: usize,
    pub num_layers:  usize,
}

impl CharRnnConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> CharRnn<B> {
        let layers: Vec<Lstm<B>> = (0..self.num_layers)
            .map(|i| {
                let d_input = if i == 0 { self.vocab_size } else { self.hidden_size };
                LstmConfig::new(d_input, self.hidden_size, true).init(device)
            })
            .collect();
        let output = LinearConfig::new(self.hidden_size, self.vocab_size).init(device);
        CharRnn { layers, output, vocab_size: self.vocab_size }
    }

    /// True when a checkpoint written with `other` fits this architecture
    pub fn matches(&self, other: &CharRnnConfig) -> bool {
        self.vocab_size == other.vocab_size
            && self.hidden_size == other.hidden_size
            && self.num_layers == other.num_layers
    }
}

/// Stacked LSTM over one-hot characters with a linear head.
/// Softmax over the head's logits is the next-character distribution.
#[derive(Module, Debug)]
pub struct CharRnn<B: Backend> {
    pub layers:     Vec<Lstm<B>>,
    pub output:     Linear<B>,
    pub vocab_size: usize,
}

impl<B: Backend> CharRnn<B> {
    /// inputs: [steps, batch, vocab] (time-major) → logits [steps, batch, vocab]
    ///
    /// `state` continues from a previous call; `None` starts from zeros.
    pub fn forward(
        &self,
        inputs: Tensor<B, 3>,
        state:  Option<RnnState<B>>,
    ) -> (Tensor<B, 3>, RnnState<B>) {
        // Burn's LSTM is batch-major
        let mut x        = inputs.swap_dims(0, 1);
        let mut previous = state.unwrap_or_default().into_iter();
        let mut next     = Vec::with_capacity(self.layers.len());

        for layer in &self.layers {
            let (hidden, layer_state) = layer.forward(x, previous.next());
            next.push(layer_state);
            x = hidden;
        }

        let logits = self.output.forward(x).swap_dims(0, 1);
        (logits, next)
    }

    /// Next-character distribution: softmax of `forward` over the vocabulary axis
    pub fn predict(
        &self,
        inputs: Tensor<B, 3>,
        state:  Option<RnnState<B>>,
    ) -> (Tensor<B, 3>, RnnState<B>) {
        let (logits, state) = self.forward(inputs, state);
        (softmax(logits, 2), state)
    }

    /// Mean cross-entropy of the predicted distribution against
    /// class targets of shape [steps * batch].
    pub fn forward_loss(
        &self,
        inputs:  Tensor<B, 3>,
        targets: Tensor<B, 1, Int>,
        state:   Option<RnnState<B>>,
    ) -> (Tensor<B, 1>, RnnState<B>) {
        let (logits, state) = self.forward(inputs, state);
        let [steps, batch, vocab] = logits.dims();
        let ce = CrossEntropyLossConfig::new().init(&logits.device());
        let loss = ce.forward(logits.reshape([steps * batch, vocab]), targets);
        (loss, state)
    }
}

/// Cut the autodiff graph at a batch boundary, keeping the values.
pub fn detach_state<B: Backend>(state: RnnState<B>) -> RnnState<B> {
    state
        .into_iter()
        .map(|s| LstmState::new(s.cell.detach(), s.hidden.detach()))
        .collect()
}

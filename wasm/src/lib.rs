use sonify_core::decoder::symbols_to_string;
use sonify_core::{Decoder, Encoder, FrequencyRange, RangeOptimizer};
use wasm_bindgen::prelude::*;

fn to_js(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

#[wasm_bindgen]
pub struct WasmEncoder {
    inner: Encoder,
    range: FrequencyRange,
}

#[wasm_bindgen]
impl WasmEncoder {
    /// Encoder bound to the band `min_freq`..`max_freq` (Hz)
    #[wasm_bindgen(constructor)]
    pub fn new(min_freq: f64, max_freq: f64) -> Result<WasmEncoder, JsValue> {
        let range = FrequencyRange::new(min_freq, max_freq).map_err(to_js)?;
        Ok(WasmEncoder {
            inner: Encoder::new(),
            range,
        })
    }

    /// Encode printable ASCII text into a Float32Array of 44.1 kHz samples
    #[wasm_bindgen]
    pub fn encode(&self, text: &str) -> Result<Vec<f32>, JsValue> {
        self.inner.encode_text(text, &self.range).map_err(to_js)
    }
}

#[wasm_bindgen]
pub struct WasmDecoder {
    inner: Decoder,
    range: FrequencyRange,
}

#[wasm_bindgen]
impl WasmDecoder {
    #[wasm_bindgen(constructor)]
    pub fn new(min_freq: f64, max_freq: f64) -> Result<WasmDecoder, JsValue> {
        let range = FrequencyRange::new(min_freq, max_freq).map_err(to_js)?;
        Ok(WasmDecoder {
            inner: Decoder::new(),
            range,
        })
    }

    /// Decode mono samples back to text; unclear chunks come back as `?`
    #[wasm_bindgen]
    pub fn decode(&self, samples: &[f32], sample_rate: u32) -> Result<String, JsValue> {
        self.inner
            .decode_sequence(samples, sample_rate, &self.range)
            .map(|symbols| symbols_to_string(&symbols))
            .map_err(to_js)
    }
}

/// Recommended band for `text` as a JSON string
#[wasm_bindgen]
pub fn recommend_for_text(text: &str) -> Result<String, JsValue> {
    let recommendation = RangeOptimizer::new().recommend_for_text(text);
    serde_json::to_string(&recommendation).map_err(to_js)
}

use wasm_bindgen::prelude::*;
use tonecast_core::{guess_type_bytes, CodecConfig, Decoder, Encoder};

fn to_js(e: tonecast_core::AudioModemError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

#[wasm_bindgen]
pub struct WasmEncoder {
    inner: Encoder,
}

#[wasm_bindgen]
impl WasmEncoder {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<WasmEncoder, JsValue> {
        Encoder::new(CodecConfig::default())
            .map(|encoder| WasmEncoder { inner: encoder })
            .map_err(to_js)
    }

    /// Encode binary data into audio samples
    /// Takes a Uint8Array and returns an Int16Array at the encoder's sample rate
    #[wasm_bindgen]
    pub fn encode(&self, data: &[u8]) -> Vec<i16> {
        self.inner.encode(data)
    }

    #[wasm_bindgen(js_name = sampleRate)]
    pub fn sample_rate(&self) -> u32 {
        self.inner.config().sample_rate
    }
}

#[wasm_bindgen]
pub struct WasmDecoder {
    inner: Decoder,
}

#[wasm_bindgen]
impl WasmDecoder {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<WasmDecoder, JsValue> {
        Decoder::new(CodecConfig::default())
            .map(|decoder| WasmDecoder { inner: decoder })
            .map_err(to_js)
    }

    /// Decode audio samples back to binary data
    /// Takes an Int16Array and returns a Uint8Array of decoded data
    #[wasm_bindgen]
    pub fn decode(&self, samples: &[i16]) -> Vec<u8> {
        self.inner.decode_payload(samples).bytes
    }
}

/// Best-effort file type label for decoded bytes
#[wasm_bindgen(js_name = guessType)]
pub fn guess_type(data: &[u8]) -> String {
    guess_type_bytes(data).to_string()
}

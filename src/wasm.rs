//! WebAssembly bindings for the walkthrough.
//!
//! The page owns rendering and the highlight-decay timer: after each
//! `advance` it schedules a timeout that calls `finish_transition`.

use wasm_bindgen::prelude::*;
use crate::playback::PlaybackController;
use crate::script::{parse_script, Component, ScriptStore};

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// WebAssembly-friendly playback wrapper.
#[wasm_bindgen]
pub struct WasmWalkthrough {
    controller: PlaybackController,
}

#[wasm_bindgen]
impl WasmWalkthrough {
    /// Start the built-in walkthrough.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<WasmWalkthrough, JsError> {
        let script = ScriptStore::builtin()
            .map_err(|e| JsError::new(&format!("{}", e)))?;
        Ok(Self { controller: PlaybackController::new(script) })
    }

    /// Start a walkthrough from script JSON.
    #[wasm_bindgen]
    pub fn from_json(json: &str) -> Result<WasmWalkthrough, JsError> {
        let script = parse_script(json)
            .map_err(|e| JsError::new(&format!("{}", e)))?;
        Ok(Self { controller: PlaybackController::new(script) })
    }

    /// Step forward. Returns false at the last step.
    #[wasm_bindgen]
    pub fn advance(&mut self) -> bool {
        self.controller.advance().moved()
    }

    /// Step back. Returns false at the first step.
    #[wasm_bindgen]
    pub fn retreat(&mut self) -> bool {
        self.controller.retreat().moved()
    }

    /// Back to the first step.
    #[wasm_bindgen]
    pub fn reset(&mut self) {
        self.controller.reset();
    }

    /// Clear the transition highlight.
    #[wasm_bindgen]
    pub fn finish_transition(&mut self) {
        self.controller.finish_transition();
    }

    #[wasm_bindgen]
    pub fn is_transitioning(&self) -> bool {
        self.controller.is_transitioning()
    }

    #[wasm_bindgen]
    pub fn position(&self) -> usize {
        self.controller.position()
    }

    /// Number of steps.
    #[wasm_bindgen]
    pub fn len(&self) -> usize {
        self.controller.len()
    }

    #[wasm_bindgen]
    pub fn phase(&self) -> String {
        self.controller.current_step().phase.to_string()
    }

    #[wasm_bindgen]
    pub fn title(&self) -> String {
        self.controller.current_step().title.clone()
    }

    #[wasm_bindgen]
    pub fn narration(&self) -> String {
        self.controller.current_step().narration.clone()
    }

    /// ALU operation text, or an empty string.
    #[wasm_bindgen]
    pub fn alu_operation(&self) -> String {
        self.controller.current_step().alu_operation.clone().unwrap_or_default()
    }

    /// Get registers as JSON string.
    #[wasm_bindgen]
    pub fn registers_json(&self) -> Result<String, JsError> {
        serde_json::to_string(&self.controller.current_step().registers)
            .map_err(|e| JsError::new(&format!("{}", e)))
    }

    /// Get the bus transfer as JSON, `null` when idle.
    #[wasm_bindgen]
    pub fn bus_transfer_json(&self) -> Result<String, JsError> {
        serde_json::to_string(&self.controller.current_step().bus_transfer)
            .map_err(|e| JsError::new(&format!("{}", e)))
    }

    /// Get memory as a JSON array of cells with a `highlight` field.
    #[wasm_bindgen]
    pub fn memory_json(&self) -> Result<String, JsError> {
        let cells: Vec<serde_json::Value> = self
            .controller
            .state()
            .memory
            .cells()
            .map(|cell| {
                serde_json::json!({
                    "address": cell.address,
                    "content": cell.content,
                    "kind": cell.kind,
                    "description": cell.description,
                    "highlight": self.controller.cell_highlight(cell),
                })
            })
            .collect();
        serde_json::to_string(&cells).map_err(|e| JsError::new(&format!("{}", e)))
    }

    /// Ids of the active components.
    #[wasm_bindgen]
    pub fn active_components(&self) -> js_sys::Array {
        self.controller
            .active_set()
            .iter()
            .map(|c| JsValue::from_str(c.id()))
            .collect()
    }

    /// Whether the component with this id is active.
    #[wasm_bindgen]
    pub fn is_component_active(&self, id: &str) -> bool {
        Component::from_id(id).is_some_and(|c| self.controller.is_active(c))
    }

    /// Whether the cell at `address` is targeted by the current step.
    #[wasm_bindgen]
    pub fn is_cell_highlighted(&self, address: u32) -> bool {
        self.controller
            .state()
            .memory
            .get(address)
            .is_some_and(|cell| self.controller.is_bus_targeting(cell))
    }
}

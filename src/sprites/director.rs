//! Per-entity animation state machine.
//!
//! The director owns every tracked entity's animation state and advances
//! frames on its own logical tick clock, independent of paint rate.
//! `request_animation` is the single read API the render path uses; it also
//! drives finite-animation cleanup.

use std::sync::Arc;

use ahash::AHashMap;
use image::RgbaImage;
use tracing::{debug, error};

use crate::assets::{AssetLibrary, SheetKey};
use crate::core::config::ClientConfig;
use crate::core::types::{Millis, PlayerId};
use crate::sprites::config::SpriteLibrary;
use crate::sprites::slicer::FrameCache;

const MIN_TICKS_PER_SECOND: u32 = 10;
const MAX_TICKS_PER_SECOND: u32 = 60;
const TICKS_PER_SECOND_STEP: u32 = 10;
const MIN_TICKS_PER_FRAME: u32 = 1;
const MAX_TICKS_PER_FRAME: u32 = 10;

/// Animation state for one tracked entity.
#[derive(Debug, Clone)]
pub struct AnimationState {
    pub sprite: String,
    pub sheet: String,
    pub sheet_index: usize,
    pub row: u32,
    pub frame: u32,
    /// +1 forward, -1 backward, 0 paused-in-place.
    pub frame_direction: i32,
    pub action: String,
    pub is_playing: bool,
    pub finite: bool,
    pub completed: bool,
}

/// Outcome of one frame request. One signal per cause: `Pending` means the
/// sheet is still decoding (retry next paint), `Finished` means a finite
/// animation completed and its state was deleted (stop drawing, clean up),
/// `Unconfigured` means unknown sprite or sheet (already logged, skip).
#[derive(Debug, Clone)]
pub enum FrameRequest {
    Ready(Arc<RgbaImage>),
    Pending,
    Finished,
    Unconfigured,
}

impl FrameRequest {
    pub fn ready(&self) -> Option<&Arc<RgbaImage>> {
        match self {
            FrameRequest::Ready(frame) => Some(frame),
            _ => None,
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, FrameRequest::Finished)
    }
}

/// Owns animation states, the frame cache, and the tick clock.
pub struct AnimationDirector {
    library: SpriteLibrary,
    cache: FrameCache,
    states: AHashMap<PlayerId, AnimationState>,

    tick_count: u32,
    ticks_per_frame: u32,
    ticks_per_second: u32,
    tick_interval_ms: u64,
    last_now: Option<Millis>,
    accumulated_ms: u64,
}

impl AnimationDirector {
    pub fn new(library: SpriteLibrary, config: &ClientConfig) -> Self {
        let ticks_per_second = config
            .animation_ticks_per_second
            .clamp(MIN_TICKS_PER_SECOND, MAX_TICKS_PER_SECOND);
        Self {
            library,
            cache: FrameCache::new(),
            states: AHashMap::new(),
            tick_count: 0,
            ticks_per_frame: config
                .ticks_per_frame
                .clamp(MIN_TICKS_PER_FRAME, MAX_TICKS_PER_FRAME),
            ticks_per_second,
            tick_interval_ms: 1000 / ticks_per_second as u64,
            last_now: None,
            accumulated_ms: 0,
        }
    }

    pub fn library(&self) -> &SpriteLibrary {
        &self.library
    }

    pub fn state(&self, id: &PlayerId) -> Option<&AnimationState> {
        self.states.get(id)
    }

    pub fn remove_state(&mut self, id: &PlayerId) {
        self.states.remove(id);
    }

    /// Advance the tick clock to `now`, running as many animation ticks as
    /// the elapsed time covers.
    pub fn advance(&mut self, now: Millis) {
        let last = self.last_now.replace(now).unwrap_or(now);
        self.accumulated_ms += now.saturating_sub(last);
        while self.accumulated_ms >= self.tick_interval_ms {
            self.accumulated_ms -= self.tick_interval_ms;
            self.tick();
        }
    }

    /// One animation tick: advance every playing entity's frame, throttled
    /// to once every `ticks_per_frame` ticks. The counter wraps at 16 bits.
    pub fn tick(&mut self) {
        self.tick_count = (self.tick_count + 1) & 0xFFFF;
        if self.tick_count % self.ticks_per_frame != 0 {
            return;
        }
        for (id, state) in self.states.iter_mut() {
            if !state.is_playing {
                continue;
            }
            let Some(config) = self
                .library
                .sprite(&state.sprite)
                .and_then(|sprite| sprite.sheet(&state.sheet))
            else {
                error!(entity = %id, sprite = %state.sprite, sheet = %state.sheet, "invalid sheet config");
                continue;
            };
            let max_frames = config.cols as i64;
            if max_frames == 0 {
                continue;
            }
            if state.frame_direction != 0 {
                state.frame = ((state.frame as i64 + state.frame_direction as i64 + max_frames)
                    % max_frames) as u32;
            }
        }
    }

    /// Lazily create state for an entity, defaulting to the named sprite's
    /// first sheet and first configured animation.
    fn ensure_state(&mut self, id: &PlayerId, sprite_name: &str) {
        if self.states.contains_key(id) {
            return;
        }
        let Some(sprite) = self
            .library
            .sprite(sprite_name)
            .or_else(|| self.library.first())
        else {
            return;
        };
        let Some(sheet) = sprite.first_sheet() else {
            return;
        };
        let first_animation = sheet.animations.first();
        let action = first_animation.map(|anim| anim.name.clone()).unwrap_or_default();
        let finite = first_animation.map(|anim| anim.finite).unwrap_or(false);
        self.states.insert(
            id.clone(),
            AnimationState {
                sprite: sprite.name.clone(),
                sheet: sheet.name.clone(),
                sheet_index: 0,
                row: 0,
                frame: 0,
                frame_direction: 1,
                action,
                is_playing: true,
                finite,
                completed: false,
            },
        );
    }

    /// The render path's single read API.
    ///
    /// Lazily creates state, switches sheet/row when the action label
    /// changes, handles finite-animation completion, triggers the bulk
    /// pre-cache, and returns the sliced frame for the current position.
    pub fn request_animation(
        &mut self,
        assets: &AssetLibrary,
        id: &PlayerId,
        action: Option<&str>,
        sprite_name: &str,
    ) -> FrameRequest {
        if self.library.sprite(sprite_name).is_none() {
            error!(sprite = sprite_name, "no sprite config found");
            return FrameRequest::Unconfigured;
        }

        self.ensure_state(id, sprite_name);

        if let Some(action) = action {
            let switching = self
                .states
                .get(id)
                .map(|state| state.action != action)
                .unwrap_or(false);
            if switching {
                let sprite = self
                    .library
                    .sprite(sprite_name)
                    .expect("sprite validated above");
                let sheet = sprite.sheet_for_action(action).cloned();
                let sheet_index = sheet
                    .as_ref()
                    .and_then(|sheet| sprite.sheet_index(&sheet.name))
                    .unwrap_or(0);
                let anim = sheet
                    .as_ref()
                    .and_then(|sheet| sheet.animation_named(action).cloned());

                let state = self.states.get_mut(id).expect("state exists");
                state.action = action.to_string();
                if let Some(sheet) = sheet {
                    state.sheet = sheet.name;
                    state.sheet_index = sheet_index;
                    if let Some(anim) = anim {
                        state.row = anim.row;
                        state.finite = anim.finite;
                        state.completed = false;
                        debug!(
                            entity = %id,
                            sheet = %state.sheet,
                            row = state.row,
                            finite = state.finite,
                            "animation state switched"
                        );
                    }
                }
            }
        }

        // Finite animation observed back at frame 0 after completing a full
        // pass: delete the state entirely and signal completion.
        let snapshot = match self.states.get(id) {
            Some(state) => state.clone(),
            None => return FrameRequest::Unconfigured,
        };
        if snapshot.finite && snapshot.frame == 0 && snapshot.completed {
            debug!(entity = %id, "finite animation complete, removing state");
            self.states.remove(id);
            return FrameRequest::Finished;
        }

        let Some(sheet_config) = self
            .library
            .sprite(&snapshot.sprite)
            .and_then(|sprite| sprite.sheet(&snapshot.sheet))
            .cloned()
        else {
            error!(sprite = %snapshot.sprite, sheet = %snapshot.sheet, "failed to load sheet config");
            return FrameRequest::Unconfigured;
        };

        if sheet_config.cols == 0 || sheet_config.rows == 0 {
            error!(sprite = %snapshot.sprite, sheet = %snapshot.sheet, "sheet config has a zero-sized grid");
            return FrameRequest::Unconfigured;
        }

        if snapshot.finite && snapshot.frame == sheet_config.cols - 1 {
            self.states.get_mut(id).expect("state exists").completed = true;
        }

        let key = SheetKey::new(snapshot.sprite.clone(), snapshot.sheet.clone());
        if !self.cache.is_sheet_cached(&key) {
            self.cache_all_sheets(assets, &snapshot.sprite);
        }

        let slot = assets.sheet(&key);
        match self
            .cache
            .frame(&key, &slot, snapshot.row, snapshot.frame, &sheet_config)
        {
            Some(frame) => FrameRequest::Ready(frame),
            None => FrameRequest::Pending,
        }
    }

    /// Bulk pre-cache every sheet of a sprite. Idempotent; sheets whose
    /// images are still decoding are retried on a later request.
    pub fn cache_all_sheets(&mut self, assets: &AssetLibrary, sprite_name: &str) {
        let Some(sprite) = self.library.sprite(sprite_name).cloned() else {
            return;
        };
        for sheet in &sprite.sheets {
            let key = SheetKey::new(sprite.name.clone(), sheet.name.clone());
            let slot = assets.sheet(&key);
            self.cache.cache_sheet(&key, &slot, sheet);
        }
    }

    /// Update the action label to whatever animation owns the current row.
    fn sync_action_from_row(&mut self, id: &PlayerId) {
        let action = {
            let Some(state) = self.states.get(id) else { return };
            self.library
                .sprite(&state.sprite)
                .and_then(|sprite| sprite.sheet(&state.sheet))
                .and_then(|sheet| sheet.animation_for_row(state.row))
                .map(|anim| anim.name.clone())
        };
        if let (Some(action), Some(state)) = (action, self.states.get_mut(id)) {
            state.action = action;
        }
    }

    fn default_sprite_name(&self) -> Option<String> {
        self.library.first().map(|sprite| sprite.name.clone())
    }

    // --- Direct control methods (editor/debug path, not gameplay) ---

    pub fn next_sprite(&mut self, id: &PlayerId) {
        self.step_sprite(id, 1);
    }

    pub fn previous_sprite(&mut self, id: &PlayerId) {
        self.step_sprite(id, -1);
    }

    fn step_sprite(&mut self, id: &PlayerId, step: i32) {
        let Some(default_sprite) = self.default_sprite_name() else { return };
        self.ensure_state(id, &default_sprite);

        let current = match self.states.get(id) {
            Some(state) => state.sprite.clone(),
            None => return,
        };
        let count = self.library.len() as i32;
        let index = self.library.sprite_index(&current).unwrap_or(0) as i32;
        let next = ((index + step + count) % count) as usize;
        let sprite_name = self.library.sprites[next].name.clone();
        let sheet_name = match self.library.sprites[next].first_sheet() {
            Some(sheet) => sheet.name.clone(),
            None => return,
        };

        let state = self.states.get_mut(id).expect("state exists");
        state.sprite = sprite_name;
        state.sheet = sheet_name;
        state.sheet_index = 0;
        state.row = 0;
        state.frame = 0;
        self.sync_action_from_row(id);
    }

    pub fn next_sheet(&mut self, id: &PlayerId) {
        self.step_sheet(id, 1);
    }

    pub fn previous_sheet(&mut self, id: &PlayerId) {
        self.step_sheet(id, -1);
    }

    /// Sheet changes preserve play/pause state.
    fn step_sheet(&mut self, id: &PlayerId, step: i32) {
        let Some(default_sprite) = self.default_sprite_name() else { return };
        self.ensure_state(id, &default_sprite);

        let (sprite_name, sheet_index, was_playing) = match self.states.get(id) {
            Some(state) => (state.sprite.clone(), state.sheet_index, state.is_playing),
            None => return,
        };
        let Some(sprite) = self.library.sprite(&sprite_name) else {
            return;
        };
        let count = sprite.sheets.len() as i32;
        let next = ((sheet_index as i32 + step + count) % count) as usize;
        let sheet_name = sprite.sheets[next].name.clone();

        let state = self.states.get_mut(id).expect("state exists");
        state.sheet_index = next;
        state.sheet = sheet_name;
        state.row = 0;
        state.frame = 0;
        state.is_playing = was_playing;
        self.sync_action_from_row(id);
    }

    pub fn next_animation(&mut self, id: &PlayerId) {
        self.step_row(id, 1);
    }

    pub fn previous_animation(&mut self, id: &PlayerId) {
        self.step_row(id, -1);
    }

    fn step_row(&mut self, id: &PlayerId, step: i32) {
        let Some(default_sprite) = self.default_sprite_name() else { return };
        self.ensure_state(id, &default_sprite);

        let rows = {
            let Some(state) = self.states.get(id) else { return };
            match self
                .library
                .sprite(&state.sprite)
                .and_then(|sprite| sprite.sheet(&state.sheet))
            {
                Some(config) => config.rows as i32,
                None => return,
            }
        };

        let state = self.states.get_mut(id).expect("state exists");
        state.row = ((state.row as i32 + step + rows) % rows) as u32;
        state.frame = 0;
        self.sync_action_from_row(id);
    }

    pub fn next_frame(&mut self, id: &PlayerId) {
        self.step_frame(id, 1);
    }

    pub fn previous_frame(&mut self, id: &PlayerId) {
        self.step_frame(id, -1);
    }

    fn step_frame(&mut self, id: &PlayerId, step: i32) {
        let Some(default_sprite) = self.default_sprite_name() else { return };
        self.ensure_state(id, &default_sprite);

        let max_frames = {
            let Some(state) = self.states.get(id) else { return };
            match self
                .library
                .sprite(&state.sprite)
                .and_then(|sprite| sprite.sheet(&state.sheet))
            {
                Some(config) => config.cols as i32,
                None => return,
            }
        };

        let state = self.states.get_mut(id).expect("state exists");
        if state.frame_direction != 0 {
            state.frame_direction = step;
        }
        state.frame = ((state.frame as i32 + step + max_frames) % max_frames) as u32;
    }

    pub fn play(&mut self, id: &PlayerId) {
        let Some(default_sprite) = self.default_sprite_name() else { return };
        self.ensure_state(id, &default_sprite);
        if let Some(state) = self.states.get_mut(id) {
            state.frame_direction = 1;
            state.is_playing = true;
        }
    }

    pub fn pause(&mut self, id: &PlayerId) {
        let Some(default_sprite) = self.default_sprite_name() else { return };
        self.ensure_state(id, &default_sprite);
        if let Some(state) = self.states.get_mut(id) {
            state.frame_direction = 0;
            state.is_playing = false;
        }
    }

    // --- Tick-rate controls ---

    pub fn ticks_per_second(&self) -> u32 {
        self.ticks_per_second
    }

    pub fn ticks_per_frame(&self) -> u32 {
        self.ticks_per_frame
    }

    /// Rebuild the tick clock at a new rate; accumulated partial time is
    /// discarded, matching the original's timer rebuild.
    pub fn set_ticks_per_second(&mut self, target: u32) {
        self.ticks_per_second = target.clamp(MIN_TICKS_PER_SECOND, MAX_TICKS_PER_SECOND);
        self.tick_interval_ms = 1000 / self.ticks_per_second as u64;
        self.accumulated_ms = 0;
    }

    pub fn lower_ticks_per_second(&mut self) {
        self.set_ticks_per_second(self.ticks_per_second.saturating_sub(TICKS_PER_SECOND_STEP));
    }

    pub fn raise_ticks_per_second(&mut self) {
        self.set_ticks_per_second(self.ticks_per_second + TICKS_PER_SECOND_STEP);
    }

    pub fn lower_ticks_per_frame(&mut self) {
        self.ticks_per_frame = self.ticks_per_frame.saturating_sub(1).max(MIN_TICKS_PER_FRAME);
    }

    pub fn raise_ticks_per_frame(&mut self) {
        self.ticks_per_frame = (self.ticks_per_frame + 1).min(MAX_TICKS_PER_FRAME);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sprites::config::{AnimationRow, SheetConfig, SpriteConfig};
    use image::RgbaImage;
    use proptest::prelude::*;

    fn library() -> SpriteLibrary {
        SpriteLibrary {
            sprites: vec![
                SpriteConfig {
                    name: "TheAdventurer".to_string(),
                    sheets: vec![
                        SheetConfig {
                            name: "idle.png".to_string(),
                            rows: 2,
                            cols: 4,
                            max_width: None,
                            max_height: None,
                            animations: vec![
                                AnimationRow { row: 0, name: "Sidle".to_string(), finite: false },
                                AnimationRow { row: 1, name: "Nidle".to_string(), finite: false },
                            ],
                        },
                        SheetConfig {
                            name: "walk.png".to_string(),
                            rows: 2,
                            cols: 4,
                            max_width: None,
                            max_height: None,
                            animations: vec![
                                AnimationRow { row: 0, name: "Swalk".to_string(), finite: false },
                                AnimationRow { row: 1, name: "Nwalk".to_string(), finite: false },
                            ],
                        },
                    ],
                },
                SpriteConfig {
                    name: "pop".to_string(),
                    sheets: vec![SheetConfig {
                        name: "pop.png".to_string(),
                        rows: 1,
                        cols: 3,
                        max_width: None,
                        max_height: None,
                        animations: vec![AnimationRow {
                            row: 0,
                            name: "pop".to_string(),
                            finite: true,
                        }],
                    }],
                },
            ],
        }
    }

    fn assets_with_all_sheets() -> AssetLibrary {
        let mut assets = AssetLibrary::new();
        assets.insert_sheet(SheetKey::new("TheAdventurer", "idle.png"), RgbaImage::new(8, 4));
        assets.insert_sheet(SheetKey::new("TheAdventurer", "walk.png"), RgbaImage::new(8, 4));
        assets.insert_sheet(SheetKey::new("pop", "pop.png"), RgbaImage::new(6, 2));
        assets
    }

    fn director() -> AnimationDirector {
        AnimationDirector::new(library(), &ClientConfig::default())
    }

    #[test]
    fn test_tick_advances_playing_entities_modulo_cols() {
        let mut director = director();
        let id = PlayerId::from("p1");
        let assets = assets_with_all_sheets();
        director.request_animation(&assets, &id, None, "TheAdventurer");

        for _ in 0..4 {
            director.tick();
        }
        assert_eq!(director.state(&id).unwrap().frame, 0); // wrapped 4 cols

        director.tick();
        assert_eq!(director.state(&id).unwrap().frame, 1);
    }

    #[test]
    fn test_ticks_per_frame_throttles_advancement() {
        let mut director = director();
        director.raise_ticks_per_frame(); // 2 ticks per frame
        let id = PlayerId::from("p1");
        let assets = assets_with_all_sheets();
        director.request_animation(&assets, &id, None, "TheAdventurer");

        director.tick(); // tick_count 1, 1 % 2 != 0
        assert_eq!(director.state(&id).unwrap().frame, 0);
        director.tick(); // tick_count 2
        assert_eq!(director.state(&id).unwrap().frame, 1);
    }

    #[test]
    fn test_advance_runs_elapsed_ticks() {
        let mut director = director();
        let id = PlayerId::from("p1");
        let assets = assets_with_all_sheets();
        director.request_animation(&assets, &id, None, "TheAdventurer");

        director.advance(0);
        director.advance(250); // 100ms interval -> 2 ticks
        assert_eq!(director.state(&id).unwrap().frame, 2);
    }

    #[test]
    fn test_frame_stepping_wraps_both_directions() {
        let mut director = director();
        let id = PlayerId::from("p1");
        let assets = assets_with_all_sheets();
        director.request_animation(&assets, &id, None, "TheAdventurer");

        director.previous_frame(&id);
        assert_eq!(director.state(&id).unwrap().frame, 3);
        for _ in 0..4 {
            director.next_frame(&id);
        }
        assert_eq!(director.state(&id).unwrap().frame, 3);
    }

    #[test]
    fn test_action_switch_moves_to_owning_sheet_and_row() {
        let mut director = director();
        let id = PlayerId::from("p1");
        let assets = assets_with_all_sheets();

        director.request_animation(&assets, &id, Some("Nwalk"), "TheAdventurer");
        let state = director.state(&id).unwrap();
        assert_eq!(state.sheet, "walk.png");
        assert_eq!(state.row, 1);
        assert!(!state.finite);
    }

    #[test]
    fn test_finite_animation_completion_lifecycle() {
        let mut director = director();
        let id = PlayerId::from("emote:p1");
        let assets = assets_with_all_sheets();

        // Start the finite emote; first request at frame 0.
        let request = director.request_animation(&assets, &id, Some("pop"), "pop");
        assert!(request.ready().is_some());

        // Advance to the last column (cols = 3) and request: marks completed.
        director.tick();
        director.tick();
        assert_eq!(director.state(&id).unwrap().frame, 2);
        let request = director.request_animation(&assets, &id, Some("pop"), "pop");
        assert!(request.ready().is_some());
        assert!(director.state(&id).unwrap().completed);

        // Wrap back to 0; the next request deletes the state and signals.
        director.tick();
        assert_eq!(director.state(&id).unwrap().frame, 0);
        let request = director.request_animation(&assets, &id, Some("pop"), "pop");
        assert!(request.is_finished());
        assert!(director.state(&id).is_none());

        // A later request behaves as if never created.
        let request = director.request_animation(&assets, &id, Some("pop"), "pop");
        assert!(request.ready().is_some());
        assert_eq!(director.state(&id).unwrap().frame, 0);
    }

    #[test]
    fn test_zero_cols_sheet_is_unconfigured() {
        let library = SpriteLibrary {
            sprites: vec![SpriteConfig {
                name: "broken".to_string(),
                sheets: vec![SheetConfig {
                    name: "broken.png".to_string(),
                    rows: 1,
                    cols: 0,
                    max_width: None,
                    max_height: None,
                    animations: vec![AnimationRow {
                        row: 0,
                        name: "Sidle".to_string(),
                        finite: false,
                    }],
                }],
            }],
        };
        let mut director = AnimationDirector::new(library, &ClientConfig::default());
        let id = PlayerId::from("p1");
        let mut assets = AssetLibrary::new();
        assets.insert_sheet(SheetKey::new("broken", "broken.png"), RgbaImage::new(8, 4));

        // A degenerate grid reads as unconfigured rather than panicking.
        for _ in 0..2 {
            let request = director.request_animation(&assets, &id, Some("Sidle"), "broken");
            assert!(matches!(request, FrameRequest::Unconfigured));
        }
    }

    #[test]
    fn test_throttle_survives_tick_counter_wrap() {
        let mut director = director();
        director.raise_ticks_per_frame(); // 2 ticks per frame
        let id = PlayerId::from("p1");
        let assets = assets_with_all_sheets();
        director.request_animation(&assets, &id, None, "TheAdventurer");

        // Drive the counter through its full 16-bit range; it lands back on
        // zero after 65536 ticks, of which 32768 advanced the frame
        // (a multiple of the 4 columns).
        for _ in 0..65_536 {
            director.tick();
        }
        assert_eq!(director.state(&id).unwrap().frame, 0);

        director.tick();
        assert_eq!(director.state(&id).unwrap().frame, 0);
        director.tick();
        assert_eq!(director.state(&id).unwrap().frame, 1);
    }

    #[test]
    fn test_unknown_sprite_is_unconfigured_and_stateless() {
        let mut director = director();
        let id = PlayerId::from("p1");
        let assets = assets_with_all_sheets();

        for _ in 0..2 {
            let request = director.request_animation(&assets, &id, Some("Swalk"), "NoSuchSprite");
            assert!(matches!(request, FrameRequest::Unconfigured));
        }
        assert!(director.state(&id).is_none());
    }

    #[test]
    fn test_pending_sheet_reports_pending_then_ready() {
        let mut director = director();
        let id = PlayerId::from("p1");
        let mut assets = AssetLibrary::new();

        let request = director.request_animation(&assets, &id, None, "TheAdventurer");
        assert!(matches!(request, FrameRequest::Pending));

        assets.insert_sheet(SheetKey::new("TheAdventurer", "idle.png"), RgbaImage::new(8, 4));
        assets.insert_sheet(SheetKey::new("TheAdventurer", "walk.png"), RgbaImage::new(8, 4));
        let request = director.request_animation(&assets, &id, None, "TheAdventurer");
        assert!(request.ready().is_some());
    }

    #[test]
    fn test_sheet_step_preserves_playing_flag() {
        let mut director = director();
        let id = PlayerId::from("p1");
        let assets = assets_with_all_sheets();
        director.request_animation(&assets, &id, None, "TheAdventurer");
        director.pause(&id);

        director.next_sheet(&id);
        let state = director.state(&id).unwrap();
        assert_eq!(state.sheet, "walk.png");
        assert!(!state.is_playing);
        assert_eq!(state.action, "Swalk");
    }

    #[test]
    fn test_tick_rate_bounds() {
        let mut director = director();
        for _ in 0..10 {
            director.lower_ticks_per_second();
        }
        assert_eq!(director.ticks_per_second(), 10);
        for _ in 0..10 {
            director.raise_ticks_per_second();
        }
        assert_eq!(director.ticks_per_second(), 60);
        for _ in 0..12 {
            director.raise_ticks_per_frame();
        }
        assert_eq!(director.ticks_per_frame(), 10);
    }

    proptest! {
        /// However many ticks elapse, a looping animation's frame stays
        /// inside the sheet's column count.
        #[test]
        fn prop_frame_stays_within_sheet(ticks in 0u32..500) {
            let mut director = director();
            let id = PlayerId::from("p1");
            let assets = assets_with_all_sheets();
            director.request_animation(&assets, &id, None, "TheAdventurer");

            for _ in 0..ticks {
                director.tick();
            }
            prop_assert!(director.state(&id).unwrap().frame < 4);
        }
    }
}

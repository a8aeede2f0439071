//! Authoritative local player state.
//!
//! The store holds the merged view the scene renders from: the locally
//! predicted self plus the last server roster for everyone else. The
//! server's unmodified view of the self is kept alongside so it can be
//! drawn as a reconciliation shadow.

use ahash::AHashMap;
use tracing::warn;

use crate::core::types::PlayerId;
use crate::net::RemotePlayer;

/// One player as the scene sees it. Head and foot lines are always derived
/// from the center and the base height.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerState {
    pub id: PlayerId,
    pub x: f32,
    pub y: f32,
    pub base_height: f32,
    pub height: f32,
    pub head_y: f32,
    pub foot_y: f32,
    pub action: Option<String>,
    pub character: Option<String>,
    pub emote: Option<String>,
}

impl PlayerState {
    pub fn new(id: PlayerId, x: f32, y: f32, base_height: f32, character: Option<String>) -> Self {
        let mut state = Self {
            id,
            x,
            y,
            base_height,
            height: base_height,
            head_y: 0.0,
            foot_y: 0.0,
            action: None,
            character,
            emote: None,
        };
        state.recompute_extents();
        state
    }

    /// Re-derive head and foot lines from the center position.
    pub fn recompute_extents(&mut self) {
        self.height = self.base_height;
        self.head_y = self.y - self.base_height / 2.0;
        self.foot_y = self.y + self.base_height / 2.0;
    }
}

/// Players keyed by id, plus the server's shadow copies.
#[derive(Debug, Default)]
pub struct PlayerStore {
    players: AHashMap<PlayerId, PlayerState>,
    server_players: AHashMap<PlayerId, PlayerState>,
    server_self: Option<PlayerState>,
    self_id: Option<PlayerId>,
    version: u64,
}

impl PlayerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bumped on every mutation; the scene uses it to skip rebuilds.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn set_self_id(&mut self, id: PlayerId) {
        self.self_id = Some(id);
        self.version += 1;
    }

    pub fn self_id(&self) -> Option<&PlayerId> {
        self.self_id.as_ref()
    }

    pub fn player(&self, id: &PlayerId) -> Option<&PlayerState> {
        self.players.get(id)
    }

    pub fn current_player(&self) -> Option<&PlayerState> {
        self.players.get(self.self_id.as_ref()?)
    }

    pub fn players(&self) -> &AHashMap<PlayerId, PlayerState> {
        &self.players
    }

    pub fn server_players(&self) -> &AHashMap<PlayerId, PlayerState> {
        &self.server_players
    }

    pub fn server_self(&self) -> Option<&PlayerState> {
        self.server_self.as_ref()
    }

    pub fn initialize_player(
        &mut self,
        id: PlayerId,
        x: f32,
        y: f32,
        base_height: f32,
        character: Option<String>,
    ) {
        self.players
            .insert(id.clone(), PlayerState::new(id, x, y, base_height, character));
        self.version += 1;
    }

    /// Apply a locally validated movement. Character is preserved; the
    /// emote is overwritten with whatever the movement carried, so plain
    /// movement clears an active emote.
    pub fn set_player_position(
        &mut self,
        id: &PlayerId,
        x: f32,
        y: f32,
        action: Option<String>,
        emote: Option<String>,
    ) {
        let Some(player) = self.players.get_mut(id) else {
            warn!(player = %id, "position update for unknown player");
            return;
        };
        player.x = x;
        player.y = y;
        player.action = action;
        player.emote = emote;
        player.recompute_extents();
        self.version += 1;
    }

    /// Merge a full server roster: every other player is replaced by the
    /// server's copy, the local self is preserved, and the server's copy of
    /// the self is kept separately as the reconciliation shadow.
    pub fn apply_server_roster(
        &mut self,
        roster: &AHashMap<PlayerId, RemotePlayer>,
        base_height: f32,
    ) {
        let Some(self_id) = self.self_id.clone() else {
            warn!("roster received before handshake");
            return;
        };

        let to_state = |id: &PlayerId, remote: &RemotePlayer| {
            let mut state = PlayerState::new(
                id.clone(),
                remote.x,
                remote.y,
                base_height,
                remote.character.clone(),
            );
            state.action = remote.current_action_state.clone();
            state.emote = remote.emote_state.clone();
            state
        };

        self.server_self = roster.get(&self_id).map(|remote| to_state(&self_id, remote));

        let local_self = self.players.remove(&self_id);
        self.players.clear();
        self.server_players.clear();
        for (id, remote) in roster {
            if *id == self_id {
                continue;
            }
            let state = to_state(id, remote);
            self.server_players.insert(id.clone(), state.clone());
            self.players.insert(id.clone(), state);
        }
        if let Some(local_self) = local_self {
            self.players.insert(self_id, local_self);
        }
        self.version += 1;
    }

    pub fn remove_player(&mut self, id: &PlayerId) {
        self.players.remove(id);
        self.server_players.remove(id);
        self.version += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn remote(x: f32, y: f32, action: &str) -> RemotePlayer {
        RemotePlayer {
            x,
            y,
            current_action_state: Some(action.to_string()),
            character: Some("TheAdventurer".to_string()),
            emote_state: None,
        }
    }

    #[test]
    fn test_extents_follow_center() {
        let mut store = PlayerStore::new();
        let id = PlayerId::from("p1");
        store.initialize_player(id.clone(), 0.0, 100.0, 32.0, None);

        let player = store.player(&id).unwrap();
        assert_eq!(player.head_y, 84.0);
        assert_eq!(player.foot_y, 116.0);

        store.set_player_position(&id, 10.0, 50.0, Some("Swalk".to_string()), None);
        let player = store.player(&id).unwrap();
        assert_eq!(player.head_y, 34.0);
        assert_eq!(player.foot_y, 66.0);
        assert_eq!(player.action.as_deref(), Some("Swalk"));
    }

    #[test]
    fn test_movement_clears_emote() {
        let mut store = PlayerStore::new();
        let id = PlayerId::from("p1");
        store.initialize_player(id.clone(), 0.0, 0.0, 32.0, None);
        store.set_player_position(&id, 0.0, 0.0, None, Some("pop".to_string()));
        assert_eq!(store.player(&id).unwrap().emote.as_deref(), Some("pop"));

        store.set_player_position(&id, 5.0, 0.0, Some("SEwalk".to_string()), None);
        assert!(store.player(&id).unwrap().emote.is_none());
    }

    #[test]
    fn test_roster_preserves_local_self() {
        let mut store = PlayerStore::new();
        let me = PlayerId::from("me");
        let other = PlayerId::from("other");
        store.set_self_id(me.clone());
        store.initialize_player(me.clone(), 1.0, 2.0, 32.0, Some("TheAdventurer".to_string()));

        let mut roster = AHashMap::new();
        roster.insert(me.clone(), remote(99.0, 99.0, "Nwalk"));
        roster.insert(other.clone(), remote(10.0, 20.0, "Sidle"));
        store.apply_server_roster(&roster, 32.0);

        // Local prediction wins for the self.
        let local = store.player(&me).unwrap();
        assert_eq!((local.x, local.y), (1.0, 2.0));
        // The server's copy is retained as the shadow.
        let shadow = store.server_self().unwrap();
        assert_eq!((shadow.x, shadow.y), (99.0, 99.0));
        // Others come straight from the server.
        assert_eq!(store.player(&other).unwrap().x, 10.0);
        assert_eq!(store.server_players().len(), 1);
    }

    #[test]
    fn test_roster_drops_departed_players() {
        let mut store = PlayerStore::new();
        let me = PlayerId::from("me");
        store.set_self_id(me.clone());
        store.initialize_player(me.clone(), 0.0, 0.0, 32.0, None);

        let mut roster = AHashMap::new();
        roster.insert(PlayerId::from("gone"), remote(0.0, 0.0, "Sidle"));
        store.apply_server_roster(&roster, 32.0);
        assert!(store.player(&PlayerId::from("gone")).is_some());

        store.apply_server_roster(&AHashMap::new(), 32.0);
        assert!(store.player(&PlayerId::from("gone")).is_none());
        assert!(store.player(&me).is_some());
    }

    #[test]
    fn test_version_bumps_on_mutation() {
        let mut store = PlayerStore::new();
        let v0 = store.version();
        store.set_self_id(PlayerId::from("me"));
        assert!(store.version() > v0);
    }
}

use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use shared::ids::random_id;
use shared::kinds::{handle_input, round_time};
use shared::{
    create_entity, lerp, phys_from_px, phys_from_sprite_px, px_from_phys, reconcile_client,
    DecodeError, Entity, EntityRecord, InputState, Point, ReconcileReport, Side, Surface, World,
    PX_WORLD_HEIGHT, PX_WORLD_WIDTH,
};

/// Seconds of game over before the action key may request a new round.
pub const RESET_DELAY: f32 = 2.0;
const DECOR_COUNT: usize = 100;
const PATH_COUNT: usize = 8;

/// Client-side view of the world: the local player is predicted here and
/// everything else follows the server's snapshots.
pub struct ClientGame {
    world: World,
    /// Purely cosmetic entities that never leave this client.
    decor: Vec<Entity>,
    player_id: String,
    game_over_count: f32,
    best_time: Option<f32>,
    reset_requested: bool,

    pub smoothing: bool,
    pub show_boxes: bool,
}

impl ClientGame {
    pub fn new(seed: u64) -> Result<Self, DecodeError> {
        let mut game = Self {
            world: World::new(Side::Client, seed),
            decor: Vec::new(),
            player_id: random_id(),
            game_over_count: 0.0,
            best_time: None,
            reset_requested: false,
            smoothing: true,
            show_boxes: false,
        };
        game.spawn_player()?;
        game.decor = create_decor(seed)?;
        info!("Playing as {}", game.player_id);
        Ok(game)
    }

    /// Drops the player mouse somewhere near the top of the map, left or
    /// right of the cat's lane.
    fn spawn_player(&mut self) -> Result<(), DecodeError> {
        let mut rng = rand::thread_rng();
        let mut mouse = create_entity("mouse", &self.player_id)?;

        let (from, to) = if rng.gen_bool(0.5) {
            (0.4, 0.45)
        } else {
            (0.55, 0.6)
        };
        let px_x = lerp(from * PX_WORLD_WIDTH, to * PX_WORLD_WIDTH, rng.gen());
        let px_y = lerp(0.0, 0.1 * PX_WORLD_HEIGHT, rng.gen());
        mouse.set_mid_x(phys_from_px(px_x));
        mouse.set_min_y(phys_from_px(px_y));

        self.world.push(mouse);
        Ok(())
    }

    pub fn player_id(&self) -> &str {
        &self.player_id
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn decor(&self) -> &[Entity] {
        &self.decor
    }

    /// The local player, unless it has been eaten.
    pub fn player(&self) -> Option<&Entity> {
        self.world.find(&self.player_id).filter(|player| !player.done)
    }

    /// One fixed step. `input.action_pressed` is consumed by the first step
    /// of the frame.
    pub fn update(&mut self, dt: f32, input: &mut InputState) {
        if self.world.game_over {
            self.game_over_count += dt;
        }

        if self.game_over_count > RESET_DELAY && input.action_pressed && !self.reset_requested {
            info!("Requesting a new round");
            self.reset_requested = true;
        }

        if let Some(index) = self.world.index_of(&self.player_id) {
            handle_input(&mut self.world, index, input, dt);
        }

        self.world.tick(dt);
        input.end_frame();

        if self.world.game_over {
            self.record_time();
        }
    }

    fn record_time(&mut self) {
        if let Some(time) = self.round_time() {
            if self.best_time.map_or(true, |best| time > best) {
                self.best_time = Some(time);
            }
        }
    }

    /// Returns true once per reset request.
    pub fn take_reset_request(&mut self) -> bool {
        std::mem::take(&mut self.reset_requested)
    }

    /// Payload for the next outbound `Update`: the player unless done, then
    /// everything queued locally since the last send.
    pub fn server_update_data(&mut self) -> Vec<EntityRecord> {
        let mut data = Vec::new();
        if let Some(player) = self.player() {
            data.push(player.to_record());
        }
        data.extend(self.world.outbound.drain(&self.world.entities));
        data
    }

    pub fn apply_server_update(&mut self, records: &[EntityRecord]) -> ReconcileReport {
        reconcile_client(&mut self.world, Some(&self.player_id), records, self.smoothing)
    }

    /// Server announced a new round: drop everything and respawn the player.
    /// The next snapshot fills in the rest.
    pub fn apply_reset(&mut self) -> Result<(), DecodeError> {
        self.world.clear();
        self.game_over_count = 0.0;
        self.reset_requested = false;
        self.spawn_player()?;
        info!("New round started");
        Ok(())
    }

    pub fn is_game_over(&self) -> bool {
        self.world.game_over
    }

    pub fn can_request_reset(&self) -> bool {
        self.game_over_count > RESET_DELAY
    }

    /// Elapsed time of the current round, as counted by the timer entity.
    pub fn round_time(&self) -> Option<f32> {
        round_time(&self.world.entities)
    }

    /// Longest round survived so far.
    pub fn best_time(&self) -> Option<f32> {
        self.best_time
    }

    /// Camera centre in world pixels. Follows the cat once the player is out
    /// of the game.
    pub fn camera_center(&self) -> Point {
        let player = self.player();
        let target = if player.is_none() || self.world.game_over {
            self.world.first_of("cat").or(player)
        } else {
            player
        };

        match target {
            Some(entity) => Point::new(px_from_phys(entity.mid_x()), px_from_phys(entity.mid_y())),
            None => Point::new(PX_WORLD_WIDTH / 2.0, PX_WORLD_HEIGHT / 2.0),
        }
    }

    /// Everything visible from `center`, back to front.
    pub fn render_list(&self, center: Point) -> Vec<&Entity> {
        let mut list: Vec<&Entity> = self
            .world
            .entities
            .iter()
            .chain(self.decor.iter())
            .filter(|entity| entity.can_render(center))
            .collect();
        list.sort_by(|a, b| a.max_y().total_cmp(&b.max_y()));
        list
    }

    pub fn render(&self, surface: &mut dyn Surface, center: Point) {
        let list = self.render_list(center);
        debug!("Rendering {} entities", list.len());
        for entity in list {
            entity.render(surface, center);
        }
    }
}

/// Grass tufts scattered over the map plus the path leading down to the
/// houses. Seeded so every client sees the same layout.
fn create_decor(seed: u64) -> Result<Vec<Entity>, DecodeError> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut decor = Vec::with_capacity(DECOR_COUNT + PATH_COUNT);

    for _ in 0..DECOR_COUNT {
        let mut tuft = create_entity("decor", &random_id())?;
        tuft.set_mid_x(phys_from_px((rng.gen::<f32>() * PX_WORLD_WIDTH).round()));
        tuft.set_max_y(phys_from_px((rng.gen::<f32>() * PX_WORLD_HEIGHT).round()));
        decor.push(tuft);
    }

    for i in 0..PATH_COUNT {
        let mut path = create_entity("path", &random_id())?;
        path.set_mid_x(phys_from_px(PX_WORLD_WIDTH / 2.0));
        path.set_max_y(phys_from_px(PX_WORLD_HEIGHT - 200.0) - i as f32 * phys_from_sprite_px(75.0));
        decor.push(path);
    }

    Ok(decor)
}

/// `MM:SS.cc`
pub fn format_time(seconds: f32) -> String {
    let centis = (seconds.max(0.0) * 100.0).floor() as u64;
    format!("{:02}:{:02}.{:02}", centis / 6000, (centis / 100) % 60, centis % 100)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::render::RecordingSurface;
    use shared::{FixedStepper, Kind, FRAME_LENGTH, MAX_STEPS_PER_FRAME};

    fn game() -> ClientGame {
        ClientGame::new(5).unwrap()
    }

    #[test]
    fn test_new_game_has_player_and_decor() {
        let game = game();
        let player = game.player().unwrap();

        assert_eq!(player.tag(), "mouse");
        assert_eq!(game.world().entities.len(), 1);
        assert_eq!(game.decor().len(), DECOR_COUNT + PATH_COUNT);

        let px_x = player.mid_x() / shared::PHYS_SCALE;
        assert!(
            (0.4 * PX_WORLD_WIDTH..=0.45 * PX_WORLD_WIDTH).contains(&px_x)
                || (0.55 * PX_WORLD_WIDTH..=0.6 * PX_WORLD_WIDTH).contains(&px_x)
        );
        assert!(player.min_y() <= phys_from_px(0.1 * PX_WORLD_HEIGHT));
    }

    #[test]
    fn test_decor_layout_follows_seed() {
        let a = create_decor(3).unwrap();
        let b = create_decor(3).unwrap();
        let positions = |list: &[Entity]| list.iter().map(|e| (e.x, e.y)).collect::<Vec<_>>();

        assert_eq!(positions(&a), positions(&b));
    }

    #[test]
    fn test_update_data_sends_player_then_queue() {
        let mut game = game();
        let rock = create_entity("holdable", "rock").unwrap();
        game.world_mut().outbound.push(&rock);

        let data = game.server_update_data();

        assert_eq!(data.len(), 2);
        assert_eq!(data[0].id, game.player_id());
        assert_eq!(data[1].id, "rock");
        assert!(game.world().outbound.is_empty());
        assert_eq!(game.server_update_data().len(), 1);
    }

    #[test]
    fn test_server_update_leaves_player_alone() {
        let mut game = game();
        let player_x = game.player().unwrap().x;

        let mut remote_player = game.player().unwrap().to_record();
        remote_player.x = player_x + 5000.0;
        let mut tree = create_entity("tree", "t1").unwrap();
        tree.x = 100.0;

        let report = game.apply_server_update(&[remote_player, tree.to_record()]);

        assert_eq!(report.created, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(game.player().unwrap().x, player_x);
        assert!(game.world().find("t1").is_some());
    }

    #[test]
    fn test_eaten_player_stops_sending_itself() {
        let mut game = game();
        let id = game.player_id().to_string();
        game.world_mut().find_mut(&id).unwrap().done = true;

        assert!(game.player().is_none());
        assert!(game.server_update_data().is_empty());
    }

    #[test]
    fn test_camera_follows_cat_after_game_over() {
        let mut game = game();
        let mut cat = create_entity("cat", "cat").unwrap();
        cat.set_mid_x(phys_from_px(123.0));
        cat.set_mid_y(phys_from_px(45.0));
        game.world_mut().push(cat);

        let player_center = game.camera_center();
        assert_ne!(player_center, Point::new(123.0, 45.0));

        game.world_mut().game_over = true;
        assert_eq!(game.camera_center(), Point::new(123.0, 45.0));
    }

    #[test]
    fn test_reset_request_waits_for_delay() {
        let mut game = game();
        game.world_mut().game_over = true;

        let mut input = InputState {
            action_pressed: true,
            ..Default::default()
        };
        game.update(FRAME_LENGTH, &mut input);
        assert!(!game.take_reset_request());
        assert!(!input.action_pressed);

        let ticks = (RESET_DELAY / FRAME_LENGTH) as usize + 2;
        for _ in 0..ticks {
            game.update(FRAME_LENGTH, &mut InputState::default());
        }
        assert!(game.can_request_reset());

        input.action_pressed = true;
        game.update(FRAME_LENGTH, &mut input);
        assert!(game.take_reset_request());
        assert!(!game.take_reset_request());
    }

    #[test]
    fn test_action_press_survives_frame_without_ticks() {
        let mut game = game();
        let mut stepper = FixedStepper::new(FRAME_LENGTH as f64, MAX_STEPS_PER_FRAME);
        let mut input = InputState::default();
        let rolling = |game: &ClientGame| {
            matches!(&game.player().unwrap().kind, Kind::Mouse(mouse) if mouse.roll_count > 0.0)
        };

        let frame = FRAME_LENGTH as f64;
        stepper.advance(0.0, |dt| game.update(dt, &mut input));
        assert_eq!(stepper.advance(0.6 * frame, |dt| game.update(dt, &mut input)), 1);

        // Pressed on a frame that owes no tick
        input.latch(&InputState {
            action_pressed: true,
            ..Default::default()
        });
        assert_eq!(stepper.advance(0.95 * frame, |dt| game.update(dt, &mut input)), 0);
        assert!(!rolling(&game));

        input.latch(&InputState::default());
        assert_eq!(stepper.advance(1.5 * frame, |dt| game.update(dt, &mut input)), 1);
        assert!(rolling(&game));
        assert!(!input.action_pressed);
    }

    #[test]
    fn test_apply_reset_respawns_same_player() {
        let mut game = game();
        let id = game.player_id().to_string();
        game.world_mut().push(create_entity("tree", "old").unwrap());
        game.world_mut().game_over = true;

        game.apply_reset().unwrap();

        assert!(!game.is_game_over());
        assert!(game.world().find("old").is_none());
        assert_eq!(game.player().unwrap().id, id);
    }

    #[test]
    fn test_best_time_keeps_longest_round() {
        let mut game = game();
        let mut timer = create_entity("timer", "timer").unwrap();
        timer.anim_count = 30.0;
        game.world_mut().push(timer);
        game.world_mut().game_over = true;

        game.update(FRAME_LENGTH, &mut InputState::default());
        assert_eq!(game.best_time(), Some(30.0));

        game.apply_reset().unwrap();
        let mut timer = create_entity("timer", "timer2").unwrap();
        timer.anim_count = 10.0;
        game.world_mut().push(timer);
        game.world_mut().game_over = true;
        game.update(FRAME_LENGTH, &mut InputState::default());

        assert_eq!(game.best_time(), Some(30.0));
    }

    #[test]
    fn test_render_list_is_sorted_back_to_front() {
        let game = game();
        let center = game.camera_center();
        let list = game.render_list(center);

        assert!(!list.is_empty());
        assert!(list.windows(2).all(|pair| pair[0].max_y() <= pair[1].max_y()));

        let mut surface = RecordingSurface::default();
        game.render(&mut surface, center);
        assert!(!surface.rects.is_empty());
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0.0), "00:00.00");
        assert_eq!(format_time(75.5), "01:15.50");
        assert_eq!(format_time(-3.0), "00:00.00");
    }
}

//! Reference arena: walls, a tree grove, a pond, a road and one of every species.
//! Tools and integration tests start from here so they exercise the same map.

use crate::grid::Grid;
use crate::personality::{Personality, Temperament};
use crate::quest::{Quest, QuestCondition, QuestLog};
use crate::rolls::RollSource;
use crate::types::{Pos, Species};
use crate::world::World;

const ARENA_ROWS: [&str; 11] = [
    "################",
    "#..............#",
    "#..TT.....~~...#",
    "#..TT.....~~...#",
    "#..............#",
    "#....#####.....#",
    "#..............#",
    "#.,,,,,,,,,,,..#",
    "#..............#",
    "#..............#",
    "################",
];

pub const ARENA_PLAYER_START: Pos = Pos { y: 8, x: 7 };

const ARENA_ROSTER: [(Species, Pos); 6] = [
    (Species::Goblin, Pos { y: 4, x: 12 }),
    (Species::Wolf, Pos { y: 1, x: 14 }),
    (Species::Bandit, Pos { y: 6, x: 2 }),
    (Species::OrcBerserker, Pos { y: 1, x: 7 }),
    (Species::Dryad, Pos { y: 2, x: 5 }),
    (Species::Wisp, Pos { y: 9, x: 13 }),
];

pub struct Scenario {
    pub world: World,
    pub quests: QuestLog,
}

impl Scenario {
    /// Builds the arena. Each monster's temperament is rolled from `rolls` in roster order.
    pub fn arena(rolls: &mut dyn RollSource) -> Self {
        let mut world = World::new(Grid::from_rows(&ARENA_ROWS), ARENA_PLAYER_START);
        for (species, pos) in ARENA_ROSTER {
            let personality = Personality::preset(Temperament::roll(rolls));
            world.spawn_monster(species, personality, pos);
        }
        world.spawn_npc("Warden", Pos { y: 9, x: 1 });
        world.spawn_obstacle(Pos { y: 6, x: 9 });

        let mut quests = QuestLog::default();
        let cull = quests.add(Quest::new(
            "Cull the greenskins",
            vec![QuestCondition::new("Slay greenskins", &["greenskin"], 2)],
        ));
        let road = quests.add(Quest::new(
            "Clear the road",
            vec![
                QuestCondition::new("Drive off an outlaw", &["outlaw"], 1),
                QuestCondition::new("Put down a beast", &["beast"], 1),
            ],
        ));
        quests.start(cull);
        quests.start(road);

        Self { world, quests }
    }
}

use space_missions::db::{Database, StoreError};
use space_missions::models::*;
use space_missions::validation::ValidationError;
use speculate2::speculate;

fn create_test_scientist(db: &Database, name: &str) -> Scientist {
    db.create_scientist(CreateScientistInput {
        name: Some(name.to_string()),
        field_of_study: Some("Astrophysics".to_string()),
        avatar: None,
    })
    .expect("Failed to create scientist")
}

fn create_test_planet(db: &Database, name: &str) -> Planet {
    db.create_planet(CreatePlanetInput {
        name: Some(name.to_string()),
        ..Default::default()
    })
    .expect("Failed to create planet")
}

fn create_test_mission(db: &Database, name: &str, scientist: &Scientist, planet: &Planet) -> Mission {
    db.create_mission(CreateMissionInput {
        name: Some(name.to_string()),
        scientist_id: Some(scientist.id),
        planet_id: Some(planet.id),
    })
    .expect("Failed to create mission")
}

fn validation_error<T: std::fmt::Debug>(result: Result<T, StoreError>) -> ValidationError {
    match result {
        Err(StoreError::Validation(e)) => e,
        other => panic!("expected a validation error, got {:?}", other),
    }
}

speculate! {
    before {
        let db = Database::open_memory().expect("Failed to create in-memory database");
        db.migrate().expect("Failed to run migrations");
    }

    describe "scientists" {
        describe "create_scientist" {
            it "creates a scientist with required fields" {
                let scientist = db.create_scientist(CreateScientistInput {
                    name: Some("Ada".to_string()),
                    field_of_study: Some("CS".to_string()),
                    avatar: None,
                }).expect("Failed to create scientist");

                assert_eq!(scientist.name, "Ada");
                assert_eq!(scientist.field_of_study, "CS");
                assert!(scientist.avatar.is_none());
                assert_eq!(scientist.created_at, scientist.updated_at);
            }

            it "rejects a missing name" {
                let err = validation_error(db.create_scientist(CreateScientistInput {
                    name: None,
                    field_of_study: Some("CS".to_string()),
                    avatar: None,
                }));
                assert_eq!(err, ValidationError::MissingScientistName);
            }

            it "rejects an empty field_of_study" {
                let err = validation_error(db.create_scientist(CreateScientistInput {
                    name: Some("Ada".to_string()),
                    field_of_study: Some(String::new()),
                    avatar: None,
                }));
                assert_eq!(err, ValidationError::MissingFieldOfStudy);
                assert!(db.get_all_scientists().expect("Query failed").is_empty());
            }

            it "rejects a duplicate name and persists nothing" {
                create_test_scientist(&db, "Ada");

                let err = validation_error(db.create_scientist(CreateScientistInput {
                    name: Some("Ada".to_string()),
                    field_of_study: Some("Math".to_string()),
                    avatar: None,
                }));

                assert_eq!(err, ValidationError::DuplicateScientistName);
                assert_eq!(db.get_all_scientists().expect("Query failed").len(), 1);
            }

            it "treats names differing only in case as distinct" {
                create_test_scientist(&db, "Ada");
                create_test_scientist(&db, "ADA");

                assert_eq!(db.get_all_scientists().expect("Query failed").len(), 2);
            }

            it "reports the name rule before the field_of_study rule" {
                let err = validation_error(db.create_scientist(CreateScientistInput::default()));
                assert_eq!(err, ValidationError::MissingScientistName);
            }
        }

        describe "get_scientist_with_missions" {
            it "returns None for non-existent scientist" {
                let result = db.get_scientist_with_missions(404).expect("Query failed");
                assert!(result.is_none());
            }

            it "nests each mission with its planet" {
                let scientist = create_test_scientist(&db, "Ada");
                let mars = create_test_planet(&db, "Mars");
                create_test_mission(&db, "Explore", &scientist, &mars);

                let found = db.get_scientist_with_missions(scientist.id)
                    .expect("Query failed")
                    .expect("Scientist missing");

                assert_eq!(found.missions.len(), 1);
                assert_eq!(found.missions[0].mission.name, "Explore");
                assert_eq!(found.missions[0].planet.name.as_deref(), Some("Mars"));
            }
        }

        describe "update_scientist" {
            it "returns None for non-existent scientist" {
                let result = db.update_scientist(404, vec![ScientistField::Avatar("a.png".into())])
                    .expect("Update failed");
                assert!(result.is_none());
            }

            it "updates only the submitted fields" {
                let scientist = create_test_scientist(&db, "Ada");

                let updated = db.update_scientist(scientist.id, vec![ScientistField::Avatar("ada.png".into())])
                    .expect("Update failed")
                    .expect("Scientist missing");

                assert_eq!(updated.avatar.as_deref(), Some("ada.png"));
                assert_eq!(updated.name, "Ada");
                assert_eq!(updated.field_of_study, "Astrophysics");
                assert!(updated.updated_at >= scientist.updated_at);
                assert_eq!(updated.created_at, scientist.created_at);
            }

            it "allows keeping the current name" {
                let scientist = create_test_scientist(&db, "Ada");

                let updated = db.update_scientist(scientist.id, vec![ScientistField::Name("Ada".into())])
                    .expect("Update failed")
                    .expect("Scientist missing");
                assert_eq!(updated.name, "Ada");
            }

            it "rejects taking another scientist's name without writing" {
                create_test_scientist(&db, "Ada");
                let grace = create_test_scientist(&db, "Grace");

                let err = validation_error(db.update_scientist(grace.id, vec![
                    ScientistField::Avatar("grace.png".into()),
                    ScientistField::Name("Ada".into()),
                ]));
                assert_eq!(err, ValidationError::DuplicateScientistName);

                let stored = db.get_scientist(grace.id).expect("Query failed").expect("Scientist missing");
                assert_eq!(stored.name, "Grace");
                assert!(stored.avatar.is_none());
            }

            it "rejects an empty field_of_study" {
                let scientist = create_test_scientist(&db, "Ada");

                let err = validation_error(db.update_scientist(scientist.id, vec![
                    ScientistField::FieldOfStudy(String::new()),
                ]));
                assert_eq!(err, ValidationError::MissingFieldOfStudy);
            }
        }

        describe "delete_scientist" {
            it "returns false for non-existent scientist" {
                assert!(!db.delete_scientist(404).expect("Delete failed"));
            }

            it "removes exactly the scientist's missions" {
                let ada = create_test_scientist(&db, "Ada");
                let grace = create_test_scientist(&db, "Grace");
                let mars = create_test_planet(&db, "Mars");
                let venus = create_test_planet(&db, "Venus");

                create_test_mission(&db, "One", &ada, &mars);
                create_test_mission(&db, "Two", &ada, &venus);
                create_test_mission(&db, "Three", &ada, &mars);
                let kept = create_test_mission(&db, "Four", &grace, &mars);

                assert!(db.delete_scientist(ada.id).expect("Delete failed"));

                assert!(db.get_scientist(ada.id).expect("Query failed").is_none());
                assert!(db.get_missions_by_scientist(ada.id).expect("Query failed").is_empty());

                let remaining = db.get_all_missions().expect("Query failed");
                assert_eq!(remaining.len(), 1);
                assert_eq!(remaining[0].id, kept.id);
                assert_eq!(db.get_all_planets().expect("Query failed").len(), 2);
            }
        }
    }

    describe "planets" {
        describe "create_planet" {
            it "creates a planet with no fields" {
                let planet = db.create_planet(CreatePlanetInput::default()).expect("Failed to create planet");
                assert!(planet.name.is_none());
                assert!(planet.image.is_none());
            }
        }

        describe "get_planet_with_missions" {
            it "nests each mission with its scientist" {
                let ada = create_test_scientist(&db, "Ada");
                let mars = create_test_planet(&db, "Mars");
                create_test_mission(&db, "Explore", &ada, &mars);

                let found = db.get_planet_with_missions(mars.id)
                    .expect("Query failed")
                    .expect("Planet missing");

                assert_eq!(found.missions.len(), 1);
                assert_eq!(found.missions[0].scientist.name, "Ada");
            }
        }

        describe "update_planet" {
            it "sets the given fields" {
                let mars = create_test_planet(&db, "Mars");

                let updated = db.update_planet(mars.id, vec![
                    PlanetField::NearestStar("Sun".into()),
                    PlanetField::Image("mars.png".into()),
                ]).expect("Update failed").expect("Planet missing");

                assert_eq!(updated.name.as_deref(), Some("Mars"));
                assert_eq!(updated.nearest_star.as_deref(), Some("Sun"));
                assert_eq!(updated.image.as_deref(), Some("mars.png"));
            }
        }

        describe "delete_planet" {
            it "cascades to the planet's missions" {
                let ada = create_test_scientist(&db, "Ada");
                let mars = create_test_planet(&db, "Mars");
                let venus = create_test_planet(&db, "Venus");
                create_test_mission(&db, "One", &ada, &mars);
                create_test_mission(&db, "Two", &ada, &venus);

                assert!(db.delete_planet(mars.id).expect("Delete failed"));

                assert!(db.get_missions_by_planet(mars.id).expect("Query failed").is_empty());
                assert_eq!(db.get_missions_by_planet(venus.id).expect("Query failed").len(), 1);
                assert!(db.get_scientist(ada.id).expect("Query failed").is_some());
            }

            it "returns false for non-existent planet" {
                assert!(!db.delete_planet(404).expect("Delete failed"));
            }
        }
    }

    describe "missions" {
        describe "create_mission" {
            it "creates a mission between existing records" {
                let ada = create_test_scientist(&db, "Ada");
                let mars = create_test_planet(&db, "Mars");

                let mission = create_test_mission(&db, "Explore", &ada, &mars);

                assert_eq!(mission.scientist_id, ada.id);
                assert_eq!(mission.planet_id, mars.id);
            }

            it "allows the same scientist and planet pair twice" {
                let ada = create_test_scientist(&db, "Ada");
                let mars = create_test_planet(&db, "Mars");

                create_test_mission(&db, "First", &ada, &mars);
                create_test_mission(&db, "Second", &ada, &mars);

                assert_eq!(db.get_all_missions().expect("Query failed").len(), 2);
            }

            it "rejects a missing name" {
                let ada = create_test_scientist(&db, "Ada");
                let mars = create_test_planet(&db, "Mars");

                let err = validation_error(db.create_mission(CreateMissionInput {
                    name: Some(String::new()),
                    scientist_id: Some(ada.id),
                    planet_id: Some(mars.id),
                }));
                assert_eq!(err, ValidationError::MissingMissionName);
            }

            it "rejects a zero scientist_id" {
                let mars = create_test_planet(&db, "Mars");

                let err = validation_error(db.create_mission(CreateMissionInput {
                    name: Some("Explore".to_string()),
                    scientist_id: Some(0),
                    planet_id: Some(mars.id),
                }));
                assert_eq!(err, ValidationError::MissingScientistId);
            }

            it "rejects an unknown scientist and persists nothing" {
                let mars = create_test_planet(&db, "Mars");

                let err = validation_error(db.create_mission(CreateMissionInput {
                    name: Some("Explore".to_string()),
                    scientist_id: Some(99),
                    planet_id: Some(mars.id),
                }));
                assert_eq!(err, ValidationError::UnknownScientist);
                assert!(db.get_all_missions().expect("Query failed").is_empty());
            }

            it "rejects an unknown planet and persists nothing" {
                let ada = create_test_scientist(&db, "Ada");

                let err = validation_error(db.create_mission(CreateMissionInput {
                    name: Some("Explore".to_string()),
                    scientist_id: Some(ada.id),
                    planet_id: Some(99),
                }));
                assert_eq!(err, ValidationError::UnknownPlanet);
                assert!(db.get_all_missions().expect("Query failed").is_empty());
            }

            it "rejects a missing planet_id" {
                let ada = create_test_scientist(&db, "Ada");

                let err = validation_error(db.create_mission(CreateMissionInput {
                    name: Some("Explore".to_string()),
                    scientist_id: Some(ada.id),
                    planet_id: None,
                }));
                assert_eq!(err, ValidationError::MissingPlanetId);
            }
        }

        describe "get_mission_with_relations" {
            it "expands both owners" {
                let ada = create_test_scientist(&db, "Ada");
                let mars = create_test_planet(&db, "Mars");
                let mission = create_test_mission(&db, "Explore", &ada, &mars);

                let found = db.get_mission_with_relations(mission.id)
                    .expect("Query failed")
                    .expect("Mission missing");

                assert_eq!(found.scientist.id, ada.id);
                assert_eq!(found.planet.id, mars.id);
            }

            it "returns None for non-existent mission" {
                assert!(db.get_mission_with_relations(404).expect("Query failed").is_none());
            }
        }

        describe "update_mission" {
            it "revalidates a reassigned planet" {
                let ada = create_test_scientist(&db, "Ada");
                let mars = create_test_planet(&db, "Mars");
                let mission = create_test_mission(&db, "Explore", &ada, &mars);

                let err = validation_error(db.update_mission(mission.id, vec![MissionField::PlanetId(Some(99))]));
                assert_eq!(err, ValidationError::UnknownPlanet);

                let stored = db.get_mission(mission.id).expect("Query failed").expect("Mission missing");
                assert_eq!(stored.planet_id, mars.id);
            }

            it "moves a mission to another planet" {
                let ada = create_test_scientist(&db, "Ada");
                let mars = create_test_planet(&db, "Mars");
                let venus = create_test_planet(&db, "Venus");
                let mission = create_test_mission(&db, "Explore", &ada, &mars);

                let updated = db.update_mission(mission.id, vec![MissionField::PlanetId(Some(venus.id))])
                    .expect("Update failed")
                    .expect("Mission missing");

                assert_eq!(updated.planet_id, venus.id);
                assert_eq!(updated.name, "Explore");
            }
        }

        describe "delete_mission" {
            it "leaves both owners in place" {
                let ada = create_test_scientist(&db, "Ada");
                let mars = create_test_planet(&db, "Mars");
                let mission = create_test_mission(&db, "Explore", &ada, &mars);

                assert!(db.delete_mission(mission.id).expect("Delete failed"));
                assert!(!db.delete_mission(mission.id).expect("Delete failed"));

                assert!(db.get_scientist(ada.id).expect("Query failed").is_some());
                assert!(db.get_planet(mars.id).expect("Query failed").is_some());
            }
        }
    }

    describe "persistence" {
        it "keeps records across reopen of a file database" {
            let dir = tempfile::tempdir().expect("Failed to create temp dir");
            let path = dir.path().join("missions.db");

            {
                let file_db = Database::open(path.clone()).expect("Failed to open");
                file_db.migrate().expect("Failed to migrate");
                create_test_scientist(&file_db, "Ada");
            }

            let reopened = Database::open(path).expect("Failed to reopen");
            reopened.migrate().expect("Failed to migrate");
            let scientists = reopened.get_all_scientists().expect("Query failed");
            assert_eq!(scientists.len(), 1);
            assert_eq!(scientists[0].name, "Ada");
        }
    }
}

//! Routes inbound commands, buttons and free text to the service and the conversation.

use super::action::Action;
use super::reply::{Button, Event, Inbound, Reply};
use crate::conversation::{Input, MatchEntry, SessionGuard, SessionStore, Step, Submission, Transition};
use crate::error::{ErrorKind, Result, TournamentError};
use crate::logic::{self, PlayoffOutcome};
use crate::models::{Participant, Phase, PlayoffStage, RoundSlot, Tournament, TournamentId, UserId};
use crate::service::TournamentService;
use crate::store::Authorizer;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fmt::Write as _;
use std::sync::Arc;

const HELP: &str = "Commands:
/add_participant <name> - register a participant
/create_tournament - start a new tournament draft
/delete_tournament - delete a tournament
/add_team_category <name,team1,team2,...> - register a team category
/remove_team_category <name> - remove a team category
/addadmin <user id>, /removeadmin <user id> - manage admins
/add_match - enter a match result
/cancel - abort the current match entry
/tournament_info - standings and bracket
/deletelastmatch - undo the last result
/start_playoff - seed the playoff from the group table
/season - season rating";

const ADMIN_COMMANDS: &[&str] = &[
    "add_participant",
    "create_tournament",
    "delete_tournament",
    "add_team_category",
    "remove_team_category",
    "addadmin",
    "removeadmin",
    "add_match",
    "deletelastmatch",
    "start_playoff",
];

/// Turns chat updates into replies.
pub struct Dispatcher {
    service: Arc<TournamentService>,
    sessions: Arc<SessionStore>,
    authorizer: Arc<dyn Authorizer>,
}

impl Dispatcher {
    pub fn new(
        service: Arc<TournamentService>,
        sessions: Arc<SessionStore>,
        authorizer: Arc<dyn Authorizer>,
    ) -> Self {
        Self {
            service,
            sessions,
            authorizer,
        }
    }

    pub async fn handle(&self, inbound: Inbound) -> Reply {
        let chat_id = inbound.chat_id;
        let user_id = inbound.user_id;
        let result = match inbound.event {
            Event::Command { name, args } => self.command(user_id, chat_id, &name, args.trim()).await,
            Event::Button { payload } => match payload.parse::<Action>() {
                Ok(action) => self.button(user_id, chat_id, action).await,
                Err(e) => Err(e),
            },
            Event::Text { text } => self.text(user_id, chat_id, text).await,
        };
        result.unwrap_or_else(|e| error_reply(chat_id, &e))
    }

    async fn require_admin(&self, user_id: UserId) -> Result<()> {
        if self.authorizer.is_admin(user_id).await {
            Ok(())
        } else {
            Err(TournamentError::precondition(
                "you don't have permission to do that",
            ))
        }
    }

    async fn command(&self, user_id: UserId, chat_id: i64, name: &str, args: &str) -> Result<Reply> {
        let name = name.trim_start_matches('/');
        if ADMIN_COMMANDS.contains(&name) {
            self.require_admin(user_id).await?;
        }
        match name {
            "start" => Ok(Reply::text(
                chat_id,
                "Welcome to the football tournament bot! Use /help to see the commands.",
            )),
            "help" => Ok(Reply::text(chat_id, HELP)),
            "add_participant" => {
                if args.is_empty() {
                    return Err(TournamentError::validation(
                        "please provide a participant name and surname",
                    ));
                }
                let participant = self.service.add_participant(args).await?;
                Ok(Reply::text(
                    chat_id,
                    format!("Participant {} has been added.", participant.name),
                ))
            }
            "create_tournament" => {
                let tournament = self.service.create_tournament(Utc::now()).await?;
                self.roster_reply(chat_id, &tournament, "A new tournament has been created. Add participants:")
                    .await
            }
            "delete_tournament" => {
                let tournaments = self.service.store().list_tournaments().await?;
                if tournaments.is_empty() {
                    return Ok(Reply::text(chat_id, "There are no tournaments to delete."));
                }
                let buttons = tournaments
                    .iter()
                    .map(|t| vec![Button::new(&t.name, Action::DeleteTournament(t.id).to_string())])
                    .collect();
                Ok(Reply::text(chat_id, "Choose the tournament to delete:").with_buttons(buttons))
            }
            "add_team_category" => {
                let category = self.service.add_team_category(args).await?;
                Ok(Reply::text(
                    chat_id,
                    format!(
                        "Category {} added with {} teams.",
                        category.name,
                        category.teams.len()
                    ),
                ))
            }
            "remove_team_category" => {
                if args.is_empty() {
                    return Err(TournamentError::validation(
                        "please provide the name of the category to remove",
                    ));
                }
                self.service.remove_team_category(args).await?;
                Ok(Reply::text(chat_id, format!("Category {args} removed.")))
            }
            "addadmin" => {
                let admin = parse_user_id(args)?;
                self.service.add_admin(admin).await?;
                Ok(Reply::text(chat_id, format!("User {admin} is now an admin.")))
            }
            "removeadmin" => {
                let admin = parse_user_id(args)?;
                self.service.remove_admin(admin).await?;
                Ok(Reply::text(chat_id, format!("User {admin} is no longer an admin.")))
            }
            "add_match" => self.add_match(user_id, chat_id).await,
            "cancel" => {
                let text = if self.sessions.delete(user_id).await {
                    "The match entry was cancelled. Start again with /add_match."
                } else {
                    "There is nothing to cancel."
                };
                Ok(Reply::text(chat_id, text))
            }
            "tournament_info" => {
                let tournament = self
                    .service
                    .current_tournament()
                    .await?
                    .ok_or_else(|| TournamentError::not_found("tournament"))?;
                Ok(Reply::text(chat_id, render_tournament(&tournament)))
            }
            "deletelastmatch" => {
                let tournament = self.running_tournament().await?;
                let (stage, last) = self
                    .service
                    .last_match(tournament.id)
                    .await?
                    .ok_or_else(|| TournamentError::not_found("match to delete"))?;
                let round = stage.map(|s| s.to_string()).unwrap_or_else(|| "group".to_string());
                Ok(Reply::text(
                    chat_id,
                    format!(
                        "Delete the last {} result {} {}:{} {}?",
                        round, last.team1, last.score1, last.score2, last.team2
                    ),
                )
                .with_buttons(vec![vec![
                    Button::new("Delete", Action::ConfirmDeleteLast.to_string()),
                    Button::new("Keep", Action::CancelDeleteLast.to_string()),
                ]]))
            }
            "start_playoff" => {
                let tournament = self.running_tournament().await?;
                let playoff = self.service.start_playoff(tournament.id).await?;
                let mut text = String::from("The playoff has started.\nSeeds:\n");
                for (i, seed) in playoff.seeds.iter().enumerate() {
                    let _ = writeln!(text, "{}. {}", i + 1, seed);
                }
                let _ = write!(
                    text,
                    "Quarterfinal: {} vs {}",
                    playoff.seeds[2], playoff.seeds[3]
                );
                Ok(Reply::text(chat_id, text))
            }
            "season" => {
                let table = self.service.season_table().await?;
                Ok(Reply::text(chat_id, render_season(&table)))
            }
            other => {
                log::debug!("Unknown command /{} from {}", other, user_id);
                Ok(Reply::text(chat_id, "Unknown command. Use /help."))
            }
        }
    }

    async fn running_tournament(&self) -> Result<Tournament> {
        self.service
            .active_tournament()
            .await?
            .ok_or_else(|| TournamentError::precondition("no tournament is running"))
    }

    async fn roster_reply(&self, chat_id: i64, tournament: &Tournament, text: &str) -> Result<Reply> {
        let participants = self.service.participants().await?;
        let mut buttons: Vec<Vec<Button>> = participants
            .iter()
            .map(|p| {
                let mark = if tournament.has_participant(&p.name) { "✓ " } else { "" };
                vec![Button::new(
                    format!("{mark}{}", p.name),
                    Action::ToggleParticipant(p.name.clone()).to_string(),
                )]
            })
            .collect();
        buttons.push(vec![Button::new(
            "Choose team category",
            Action::ChooseCategory.to_string(),
        )]);
        Ok(Reply::text(
            chat_id,
            format!(
                "{}\n{} ({}/{} participants)",
                text,
                tournament.name,
                tournament.participants.len(),
                tournament.max_participants
            ),
        )
        .with_buttons(buttons))
    }

    async fn draft_tournament(&self) -> Result<Tournament> {
        self.service
            .current_tournament()
            .await?
            .filter(|t| t.phase() == Phase::Draft)
            .ok_or_else(|| TournamentError::precondition("there is no tournament in setup"))
    }

    async fn button(&self, user_id: UserId, chat_id: i64, action: Action) -> Result<Reply> {
        if let Action::PickTeam(team) = action {
            let session = self.sessions.lock(user_id).await;
            return self.step(chat_id, session, Input::PickTeam(team)).await;
        }
        self.require_admin(user_id).await?;
        match action {
            Action::ToggleParticipant(name) => {
                let tournament = self.draft_tournament().await?;
                let (tournament, added) =
                    self.service.toggle_participant(tournament.id, &name).await?;
                let text = if added {
                    format!("{name} joined.")
                } else {
                    format!("{name} left.")
                };
                self.roster_reply(chat_id, &tournament, &text).await
            }
            Action::ChooseCategory => {
                self.draft_tournament().await?;
                let categories = self.service.team_categories().await?;
                if categories.is_empty() {
                    return Ok(Reply::text(
                        chat_id,
                        "No team categories yet. Add one with /add_team_category.",
                    ));
                }
                let buttons = categories
                    .iter()
                    .map(|c| {
                        vec![Button::new(
                            format!("{} ({} teams)", c.name, c.teams.len()),
                            Action::PickCategory(c.name.clone()).to_string(),
                        )]
                    })
                    .collect();
                Ok(Reply::text(chat_id, "Choose the team category:").with_buttons(buttons))
            }
            Action::PickCategory(name) => {
                let tournament = self.draft_tournament().await?;
                self.service.set_team_category(tournament.id, &name).await?;
                let mut rng = StdRng::from_entropy();
                let started = self.service.start_tournament(tournament.id, &mut rng).await?;
                let mut text = format!("{} has started! The draw:\n", started.name);
                for participant in &started.participants {
                    if let Some(team) = started.team_of(participant) {
                        let _ = writeln!(text, "{participant}: {team}");
                    }
                }
                Ok(Reply::text(chat_id, text.trim_end()))
            }
            Action::DeleteTournament(id) => {
                let tournament = self.service.tournament(id).await?;
                self.service.delete_tournament(id).await?;
                Ok(Reply::text(chat_id, format!("{} was deleted.", tournament.name)))
            }
            Action::ConfirmDeleteLast => {
                let tournament = self.running_tournament().await?;
                let deleted = self.service.delete_last_match(tournament.id).await?;
                let m = &deleted.removed;
                Ok(Reply::text(
                    chat_id,
                    format!(
                        "Deleted {} {}:{} {}.",
                        m.team1, m.score1, m.score2, m.team2
                    ),
                ))
            }
            Action::CancelDeleteLast => Ok(Reply::text(chat_id, "Nothing was deleted.")),
            Action::PickTeam(_) => Ok(Reply::text(chat_id, "Use /add_match to enter a result.")),
        }
    }

    async fn add_match(&self, user_id: UserId, chat_id: i64) -> Result<Reply> {
        let tournament = self.running_tournament().await?;
        let entry = match tournament.phase() {
            Phase::Group => MatchEntry::group(tournament.id),
            Phase::Playoff => {
                let (stage, team1, team2) = tournament
                    .playoff
                    .as_ref()
                    .and_then(|p| p.current_pairing())
                    .ok_or_else(|| TournamentError::precondition("no playoff match is open"))?;
                MatchEntry::playoff(tournament.id, stage, team1, team2)
            }
            Phase::Draft | Phase::Completed => {
                return Err(TournamentError::precondition("no tournament is running"))
            }
        };
        self.sessions.create(user_id, entry.clone()).await?;
        self.prompt(chat_id, &entry).await
    }

    async fn text(&self, user_id: UserId, chat_id: i64, text: String) -> Result<Reply> {
        let session = self.sessions.lock(user_id).await;
        if session.is_none() {
            return Ok(Reply::text(chat_id, "Use /help to see the commands."));
        }
        self.step(chat_id, session, Input::Text(text)).await
    }

    /// Feed one input to the user's entry while holding their session lock.
    async fn step(&self, chat_id: i64, mut session: SessionGuard, input: Input) -> Result<Reply> {
        let Some(entry) = (*session).as_mut() else {
            return Ok(Reply::text(chat_id, "Use /add_match to enter a result."));
        };
        match entry.advance(input) {
            Transition::Next(_) => {
                let entry = entry.clone();
                self.prompt(chat_id, &entry).await
            }
            Transition::Reprompt(reason) => {
                log::debug!("Rejected match entry input: {}", reason);
                Ok(Reply::text(chat_id, capitalize(&reason)))
            }
            Transition::Cancelled => {
                *session = None;
                Ok(Reply::text(chat_id, "The match entry was cancelled."))
            }
            Transition::Submit(submission) => {
                let tournament_id = entry.tournament_id;
                self.submit(chat_id, &mut session, tournament_id, submission).await
            }
        }
    }

    async fn submit(
        &self,
        chat_id: i64,
        session: &mut SessionGuard,
        tournament_id: TournamentId,
        submission: Submission,
    ) -> Result<Reply> {
        let result = match submission {
            Submission::Group {
                team1,
                team2,
                score1,
                score2,
            } => self
                .service
                .record_group_match(tournament_id, &team1, &team2, score1, score2)
                .await
                .map(|m| {
                    format!(
                        "Recorded: {} {}:{} {}",
                        m.team1, m.score1, m.score2, m.team2
                    )
                }),
            Submission::Playoff(result) => {
                match self.service.record_playoff_match(tournament_id, &result).await {
                    Ok(PlayoffOutcome::NeedsExtraTime) => {
                        if let Some(entry) = (**session).as_mut() {
                            entry.require_extra_time();
                        }
                        return Ok(Reply::text(
                            chat_id,
                            "The score is level. Enter the score after extra time as a:b",
                        ));
                    }
                    Ok(PlayoffOutcome::NeedsPenalties) => {
                        if let Some(entry) = (**session).as_mut() {
                            entry.require_penalties();
                        }
                        return Ok(Reply::text(
                            chat_id,
                            "Still level after extra time. Enter the penalty shootout as a:b",
                        ));
                    }
                    Ok(PlayoffOutcome::Advanced {
                        decided,
                        winner,
                        next,
                        next_team1,
                        next_team2,
                    }) => Ok(format!(
                        "{winner} wins the {decided}!\nNext, the {next}: {next_team1} vs {next_team2}"
                    )),
                    Ok(PlayoffOutcome::Champion { winner }) => Ok(format!(
                        "{winner} wins the final and the tournament! Season stats are updated, see /season."
                    )),
                    Err(e) => Err(e),
                }
            }
        };
        match result {
            Ok(text) => {
                **session = None;
                Ok(Reply::text(chat_id, text))
            }
            Err(e) if e.kind() == ErrorKind::Validation => Err(e),
            Err(e) => {
                **session = None;
                Err(e)
            }
        }
    }

    async fn prompt(&self, chat_id: i64, entry: &MatchEntry) -> Result<Reply> {
        let team1 = entry.team1.as_deref().unwrap_or_default();
        let team2 = entry.team2.as_deref().unwrap_or_default();
        match entry.step {
            Step::SelectTeam1 | Step::SelectTeam2 => {
                let tournament = self.service.tournament(entry.tournament_id).await?;
                let picking_first = entry.step == Step::SelectTeam1;
                let buttons = tournament
                    .teams()
                    .into_iter()
                    .filter(|t| picking_first || *t != team1)
                    .map(|t| vec![Button::new(t, Action::PickTeam(t.to_string()).to_string())])
                    .collect();
                let text = if picking_first {
                    "Choose the first team:".to_string()
                } else {
                    format!("{team1} plays against:")
                };
                Ok(Reply::text(chat_id, text).with_buttons(buttons))
            }
            Step::AwaitScore1 => Ok(Reply::text(
                chat_id,
                format!("{team1} vs {team2}\nGoals scored by {team1}:"),
            )),
            Step::AwaitScore2 => Ok(Reply::text(chat_id, format!("Goals scored by {team2}:"))),
            Step::AwaitExtraTime => Ok(Reply::text(
                chat_id,
                "Enter the score after extra time as a:b",
            )),
            Step::AwaitPenalties => Ok(Reply::text(
                chat_id,
                "Enter the penalty shootout score as a:b",
            )),
        }
    }
}

fn parse_user_id(args: &str) -> Result<UserId> {
    args.parse()
        .map_err(|_| TournamentError::validation("please provide a numeric user id"))
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn error_reply(chat_id: i64, error: &TournamentError) -> Reply {
    match error.kind() {
        ErrorKind::Storage => {
            log::error!("Request failed: {}", error);
            Reply::text(chat_id, "Something went wrong. Please try again later.")
        }
        _ => {
            log::debug!("Request rejected: {}", error);
            Reply::text(chat_id, capitalize(&error.to_string()))
        }
    }
}

fn render_slot(text: &mut String, stage: PlayoffStage, slot: &RoundSlot) {
    let _ = match slot {
        RoundSlot::Empty => writeln!(text, "{}: to be decided", capitalize(&stage.to_string())),
        RoundSlot::Pending { team1, team2 } => {
            writeln!(text, "{}: {} vs {}", capitalize(&stage.to_string()), team1, team2)
        }
        RoundSlot::Decided(m) => {
            let mut line = format!(
                "{}: {} {}:{} {}",
                capitalize(&stage.to_string()),
                m.team1,
                m.score1,
                m.score2,
                m.team2
            );
            if m.penalties {
                let _ = write!(line, " (pen. {}:{})", m.penalty_score1, m.penalty_score2);
            } else if m.extra_time {
                line.push_str(" (a.e.t.)");
            }
            writeln!(text, "{line}")
        }
    };
}

/// Plain-text overview: roster, group table and bracket.
pub fn render_tournament(tournament: &Tournament) -> String {
    let mut text = format!("{}\n", tournament.name);
    match tournament.phase() {
        Phase::Draft => {
            let _ = writeln!(
                text,
                "In setup: {}/{} participants, category {}",
                tournament.participants.len(),
                tournament.max_participants,
                tournament.team_category.as_deref().unwrap_or("not chosen")
            );
            for participant in &tournament.participants {
                let _ = writeln!(text, "- {participant}");
            }
            return text.trim_end().to_string();
        }
        Phase::Group => text.push_str("Group stage\n"),
        Phase::Playoff => text.push_str("Playoff\n"),
        Phase::Completed => text.push_str("Completed\n"),
    }
    text.push_str("\n#  Team  P W D L GF:GA GD Pts\n");
    for (i, row) in logic::ranked_standings(tournament).iter().enumerate() {
        let owner = tournament.participant_of(&row.team).unwrap_or_default();
        let _ = writeln!(
            text,
            "{}. {} ({}) {} {} {} {} {}:{} {:+} {}",
            i + 1,
            row.team,
            owner,
            row.played,
            row.won,
            row.drawn,
            row.lost,
            row.goals_for,
            row.goals_against,
            row.goal_difference,
            row.points
        );
    }
    if let Some(playoff) = tournament.playoff.as_ref() {
        text.push('\n');
        render_slot(&mut text, PlayoffStage::Quarter, &playoff.quarter_final);
        render_slot(&mut text, PlayoffStage::Semi, &playoff.semi_final);
        render_slot(&mut text, PlayoffStage::Final, &playoff.final_match);
        if let Some(winner) = playoff.winner.as_deref() {
            let _ = writeln!(text, "Winner: {winner}");
        }
    }
    text.trim_end().to_string()
}

/// Season rating, best first.
pub fn render_season(table: &[Participant]) -> String {
    if table.is_empty() {
        return "No participants registered yet.".to_string();
    }
    let mut text = String::from("Season rating\n");
    for (i, p) in table.iter().enumerate() {
        let s = &p.stats;
        let _ = writeln!(
            text,
            "{}. {} - {} pts ({} tournaments, {}W {}D {}L, goals {}:{})",
            i + 1,
            p.name,
            s.total_points,
            s.tournaments_played,
            s.wins,
            s.draws,
            s.losses,
            s.goals_scored,
            s.goals_conceded
        );
    }
    text.trim_end().to_string()
}

//! Static HTML pages served by the frontend.
//!
//! Deliberately minimal: the pages only need to exercise the JSON API.

pub const LOGIN_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>Glucose Pump</title>
<style>
body { font-family: -apple-system, 'Segoe UI', Arial, sans-serif;
       background: linear-gradient(135deg, #1e3c72 0%, #2a5298 100%);
       min-height: 100vh; display: flex; align-items: center; justify-content: center; }
.card { background: white; border-radius: 16px; padding: 28px; width: 320px;
        box-shadow: 0 20px 60px rgba(0,0,0,0.3); }
h1 { color: #1e3c72; font-size: 1.4em; text-align: center; }
input { width: 100%; margin: 6px 0; padding: 8px; box-sizing: border-box; }
button { width: 100%; margin-top: 10px; padding: 10px; border: 0; border-radius: 8px;
         background: #2a5298; color: white; cursor: pointer; }
#msg { color: #ef4444; font-size: 0.9em; min-height: 1.2em; }
</style>
</head>
<body>
<div class="card">
  <h1>&#129656; Glucose Pump</h1>
  <input id="username" placeholder="username">
  <input id="password" type="password" placeholder="password">
  <button onclick="login()">Log in</button>
  <button onclick="register()">Register</button>
  <p id="msg"></p>
</div>
<script>
function field(id) { return document.getElementById(id).value; }
function show(m) { document.getElementById('msg').textContent = m; }
async function login() {
  const res = await fetch('/api/login', { method: 'POST',
    headers: {'Content-Type': 'application/json'},
    body: JSON.stringify({ username: field('username'), password: field('password') })});
  const body = await res.json();
  if (body.status === 'ok') { location.href = '/dashboard?session=' + body.session_id; }
  else { show(body.message); }
}
async function register() {
  const email = prompt('email') || '';
  const age = prompt('age') || '';
  const weight = prompt('weight (kg)') || '';
  const res = await fetch('/api/register', { method: 'POST',
    headers: {'Content-Type': 'application/json'},
    body: JSON.stringify({ username: field('username'), password: field('password'),
                           email: email, age: age, weight: weight })});
  const body = await res.json();
  show(body.message);
}
</script>
</body>
</html>
"#;

pub const DASHBOARD_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>Glucose Pump Dashboard</title>
<style>
body { font-family: -apple-system, 'Segoe UI', Arial, sans-serif;
       background: linear-gradient(135deg, #1e3c72 0%, #2a5298 100%); min-height: 100vh;
       padding: 20px; }
.card { background: white; border-radius: 16px; padding: 24px; max-width: 480px;
        margin: 0 auto; box-shadow: 0 20px 60px rgba(0,0,0,0.3); }
.value { font-size: 3.5em; font-weight: bold; text-align: center; }
.badge { text-align: center; font-weight: bold; padding: 6px; border-radius: 18px; color: white; }
.row { display: flex; justify-content: space-between; padding: 6px 0;
       border-bottom: 1px solid #eee; }
button { margin-top: 10px; padding: 10px; border: 0; border-radius: 8px; color: white;
         cursor: pointer; width: 32%; }
#start { background: #10b981; } #stop { background: #ef4444; } #logout { background: #64748b; }
progress { width: 100%; }
</style>
</head>
<body>
<div class="card">
  <div class="value" id="glucose">--</div>
  <div style="text-align:center">mg/dL</div>
  <div class="badge" id="badge">&nbsp;</div>
  <div class="row"><span>Recommended dose</span><span id="dose">--</span></div>
  <div class="row"><span>Recommendation</span><span id="rec">--</span></div>
  <div class="row"><span>Delivery</span><span id="delivery">idle</span></div>
  <progress id="progress" max="100" value="0"></progress>
  <div>
    <button id="start" onclick="startInjection()">Start</button>
    <button id="stop" onclick="stopInjection()">Stop</button>
    <button id="logout" onclick="logout()">Log out</button>
  </div>
</div>
<script>
const session = new URLSearchParams(location.search).get('session');
async function poll() {
  const res = await fetch('/api/glucose?session=' + session);
  if (res.status === 401) { location.href = '/'; return; }
  const d = await res.json();
  document.getElementById('glucose').textContent = d.glucose;
  const badge = document.getElementById('badge');
  badge.textContent = d.icon + ' ' + d.status;
  badge.style.background = d.color;
  document.getElementById('dose').textContent = d.insulin_dose.toFixed(1) + ' U';
  document.getElementById('rec').textContent = d.insulin_recommendation;
  const inj = d.injection_status;
  document.getElementById('delivery').textContent = inj.active
    ? inj.injected_dose.toFixed(2) + ' / ' + inj.target_dose.toFixed(2) + ' U'
    : 'idle';
  document.getElementById('progress').value = inj.progress;
}
async function startInjection() {
  const dose = prompt('dose (U)') || '';
  const res = await fetch('/api/injection/start?session=' + session, { method: 'POST',
    headers: {'Content-Type': 'application/json'}, body: JSON.stringify({ dose: dose })});
  const body = await res.json();
  if (body.status !== 'ok') alert(body.message);
  poll();
}
async function stopInjection() {
  const res = await fetch('/api/injection/stop?session=' + session, { method: 'POST' });
  const body = await res.json();
  if (body.status !== 'ok') alert(body.message);
  poll();
}
async function logout() {
  await fetch('/api/logout?session=' + session, { method: 'POST' });
  location.href = '/';
}
setInterval(poll, 2000);
poll();
</script>
</body>
</html>
"#;
